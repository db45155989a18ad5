//! Generic resource CRUD commands.
//!
//! `shopfront get orders`, `shopfront create vouchers`, etc.
//! Translates resource names to REST API paths.

use std::path::Path;

use anyhow::Result;
use serde_json::Value;
use shopfront_client::ResourceClient;
use shopfront_core::PageQuery;

use super::{explain, Session};

/// Map a singular/plural resource name to (singular, api_path).
fn resource_path(resource: &str) -> Result<(&'static str, &'static str)> {
    match resource.to_lowercase().as_str() {
        "product" | "products" => Ok(("product", "/api/v1/products")),
        "category" | "categories" => Ok(("category", "/api/v1/categories")),
        "order" | "orders" => Ok(("order", "/api/v1/orders")),
        "voucher" | "vouchers" => Ok(("voucher", "/api/v1/vouchers")),
        "slider" | "sliders" => Ok(("slider", "/api/v1/sliders")),
        "user" | "users" => Ok(("user", "/api/v1/users")),
        "review" | "reviews" => Ok(("review", "/api/v1/reviews")),
        _ => Err(anyhow::anyhow!("Unknown resource type: {}", resource)),
    }
}

fn client(session: &Session, api_path: &str) -> ResourceClient<Value> {
    ResourceClient::new(session.gateway.clone(), api_path)
}

fn print_value(value: &Value, output_json: bool) -> Result<()> {
    if output_json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// GET a resource (one page of the list, or one item by ID).
pub async fn get(
    resource: &str,
    id: Option<&str>,
    page: PageQuery,
    output_json: bool,
    client_config_path: &Path,
) -> Result<()> {
    let (_, api_path) = resource_path(resource)?;
    let session = Session::open(client_config_path)?;
    let resources = client(&session, api_path);

    if let Some(id) = id {
        let item = resources.get(id).await.map_err(explain)?;
        return print_value(&item, output_json);
    }

    let list = resources.list(page).await.map_err(explain)?;
    if !output_json {
        println!(
            "# page {} ({} of {} shown)",
            page.page,
            list.items.len(),
            list.total
        );
    }
    print_value(&Value::Array(list.items), output_json)
}

/// CREATE a resource.
pub async fn create(resource: &str, json_body: &str, client_config_path: &Path) -> Result<()> {
    let (singular, api_path) = resource_path(resource)?;
    let body: Value =
        serde_json::from_str(json_body).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))?;

    let session = Session::open(client_config_path)?;
    let created = client(&session, api_path)
        .create(&body)
        .await
        .map_err(explain)?;

    println!("{} created.", singular);
    print_value(&created, false)
}

/// UPDATE a resource (PUT).
pub async fn update(
    resource: &str,
    id: &str,
    json_body: &str,
    client_config_path: &Path,
) -> Result<()> {
    let (singular, api_path) = resource_path(resource)?;
    let body: Value =
        serde_json::from_str(json_body).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))?;

    let session = Session::open(client_config_path)?;
    let updated = client(&session, api_path)
        .update(id, &body)
        .await
        .map_err(explain)?;

    println!("{} {} updated.", singular, id);
    print_value(&updated, false)
}

/// DELETE a resource.
pub async fn delete(resource: &str, id: &str, client_config_path: &Path) -> Result<()> {
    let (singular, api_path) = resource_path(resource)?;
    let session = Session::open(client_config_path)?;
    client(&session, api_path)
        .delete(id)
        .await
        .map_err(explain)?;

    println!("{} {} deleted.", singular, id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_aliases() {
        assert_eq!(resource_path("Orders").unwrap(), ("order", "/api/v1/orders"));
        assert_eq!(resource_path("category").unwrap().1, "/api/v1/categories");
        assert!(resource_path("warehouses").is_err());
    }
}
