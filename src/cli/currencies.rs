use super::ui;
use crate::core::currency::select_options;
use comfy_table::{Cell, Table};

pub fn run() {
    println!("{}", currencies_table());
}

fn currencies_table() -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell("Flag"),
    ]);
    for option in select_options() {
        table.add_row(vec![
            Cell::new(option.value),
            Cell::new(option.value.description()),
            Cell::new(ui::style_text(&option.flag, ui::StyleType::Subtle)),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_currency() {
        let table = currencies_table();
        assert_eq!(table.row_iter().count(), 57);
        assert!(table.to_string().contains("Japanese Yen"));
    }
}
