//! Table rendering for discounted products

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

use dealdesk_client::Product;

pub fn products_table(products: &[Product]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Title", "Price", "Was", "Discount", "Qty", "URL"]);

    for product in products {
        table.add_row(vec![
            Cell::new(&product.title),
            Cell::new(format!("{:.2}", product.current_price)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", product.original_price)).set_alignment(CellAlignment::Right),
            Cell::new(
                product
                    .discount()
                    .map(|d| format!("{:.0}%", d))
                    .unwrap_or_default(),
            )
            .set_alignment(CellAlignment::Right),
            Cell::new(product.qty.map(|q| q.to_string()).unwrap_or_default()),
            Cell::new(&product.product_url),
        ]);
    }
    table
}
