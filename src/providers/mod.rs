pub mod caching;
pub mod freecurrency;
pub mod mock;
pub mod spot_rate;
pub mod util;

pub use caching::CachingRateSource;
pub use freecurrency::FreeCurrencyProvider;
pub use mock::MockRateSource;
pub use spot_rate::SpotRateProvider;
