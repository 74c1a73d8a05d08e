//! Product listing.

use zentro_core::CategoryId;
use zentro_storefront::api::{ProductQuery, ProductSort};

use super::{CliError, Session};

/// Print one page of the product listing.
pub async fn list(
    session: &Session,
    page: u32,
    limit: u32,
    category: Option<CategoryId>,
    search: Option<String>,
    sort: ProductSort,
) -> Result<(), CliError> {
    let query = ProductQuery {
        page,
        limit,
        category,
        search,
        sort,
    };
    let listing = session.catalog().list_products(&query).await?;

    #[allow(clippy::print_stdout)]
    {
        for product in &listing.products {
            let marker = if session.sync.is_wishlisted(product.id) {
                "*"
            } else {
                " "
            };
            println!("{marker} {:>6}  {}  {}", product.id, product.name, product.price);
        }
        let pagination = listing.pagination;
        println!(
            "Page {} of {} ({} products)",
            pagination.page, pagination.total_pages, pagination.total_items
        );
    }
    Ok(())
}
