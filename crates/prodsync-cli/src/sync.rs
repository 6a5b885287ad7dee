//! The fetch / transform / persist pass.
//!
//! Everything runs one step at a time in collection order. A failure to fetch
//! the collection aborts the run; per-product failures during `update` are
//! logged and counted so one bad record does not stop the rest.

use std::io::Write;
use std::path::Path;

use prodsync_client::{ProductsClient, UpdateOutcome};
use prodsync_core::{encode_asset, AssetRole, CoreError, Product, ProductId};
use serde_json::Value;

pub(crate) struct UpdateOptions<'a> {
    pub assets_dir: &'a Path,
    pub dry_run: bool,
    /// Restrict the pass to a single identifier.
    pub only: Option<&'a ProductId>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct UpdateSummary {
    /// Sent and accepted, or in a dry run, prepared and ready to send.
    pub updated: usize,
    pub failed: usize,
    /// Filtered out by `--id`.
    pub skipped: usize,
}

/// Prints one `old product <record>` line per product, in order.
pub(crate) fn write_listing<W: Write>(out: &mut W, products: &[Product]) -> std::io::Result<()> {
    for product in products {
        write_old_product(out, product)?;
    }
    Ok(())
}

fn write_old_product<W: Write>(out: &mut W, product: &Product) -> std::io::Result<()> {
    let rendered = listing_repr(&product.clone().into_value());
    writeln!(out, "old product {rendered}")
}

/// Renders a value the way the listing shows records:
/// `{'id': 1, 'tags': ['a', 'b'], 'active': True, 'packshot': None}`.
fn listing_repr(value: &Value) -> String {
    let mut rendered = String::new();
    push_listing_repr(&mut rendered, value);
    rendered
}

fn push_listing_repr(buf: &mut String, value: &Value) {
    match value {
        Value::Null => buf.push_str("None"),
        Value::Bool(true) => buf.push_str("True"),
        Value::Bool(false) => buf.push_str("False"),
        Value::Number(n) => buf.push_str(&n.to_string()),
        Value::String(s) => push_quoted(buf, s),
        Value::Array(items) => {
            buf.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                push_listing_repr(buf, item);
            }
            buf.push(']');
        }
        Value::Object(fields) => {
            buf.push('{');
            for (i, (key, item)) in fields.iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                push_quoted(buf, key);
                buf.push_str(": ");
                push_listing_repr(buf, item);
            }
            buf.push('}');
        }
    }
}

/// Single quotes unless the text holds a `'` and no `"`.
fn push_quoted(buf: &mut String, text: &str) {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    buf.push(quote);
    for c in text.chars() {
        match c {
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c if c == quote => {
                buf.push('\\');
                buf.push(c);
            }
            c => buf.push(c),
        }
    }
    buf.push(quote);
}

async fn fetch_collection(client: &ProductsClient) -> anyhow::Result<Vec<Product>> {
    let products = client
        .fetch_products()
        .await
        .map_err(|e| anyhow::anyhow!("failed to fetch products: {e}"))?;
    tracing::info!(count = products.len(), "fetched products");
    Ok(products)
}

pub(crate) async fn run_list<W: Write>(client: &ProductsClient, out: &mut W) -> anyhow::Result<()> {
    let products = fetch_collection(client).await?;
    write_listing(out, &products)?;
    Ok(())
}

pub(crate) async fn run_show<W: Write>(
    client: &ProductsClient,
    id: &ProductId,
    out: &mut W,
) -> anyhow::Result<()> {
    let product = client
        .fetch_product(id)
        .await
        .map_err(|e| anyhow::anyhow!("failed to fetch product {id}: {e}"))?;
    writeln!(out, "{}", serde_json::to_string_pretty(&product)?)?;
    Ok(())
}

/// Encodes every asset the product references and attaches it to the record.
///
/// Roles whose path field is absent or `null` are left untouched.
///
/// # Errors
///
/// Returns [`CoreError::AssetRead`] for the first asset that cannot be read;
/// the product is then left partially prepared and must not be sent.
pub(crate) async fn prepare_product(
    product: &mut Product,
    assets_dir: &Path,
) -> Result<(), CoreError> {
    for role in AssetRole::ALL {
        let Some(stored_path) = product.asset_path(role).map(str::to_owned) else {
            tracing::debug!(%role, "product has no asset path; skipping role");
            continue;
        };
        let encoded = encode_asset(assets_dir, &stored_path).await?;
        product.attach_asset(role, encoded);
    }
    Ok(())
}

/// Copy of `product` with every base64 payload replaced by its length.
fn redact_payloads(product: &Product) -> Product {
    let mut redacted = product.clone();
    for role in AssetRole::ALL {
        if let Some(Value::String(payload)) = product.get(role.payload_field()) {
            redacted.set(
                role.payload_field(),
                format!("<{} base64 chars>", payload.len()),
            );
        }
    }
    redacted
}

/// Fetches the collection and updates each product with its encoded assets.
///
/// # Errors
///
/// Returns an error only if the collection cannot be fetched or stdout cannot
/// be written. Per-product failures are counted in the summary.
pub(crate) async fn run_update<W: Write>(
    client: &ProductsClient,
    options: &UpdateOptions<'_>,
    out: &mut W,
) -> anyhow::Result<UpdateSummary> {
    let products = fetch_collection(client).await?;
    let mut summary = UpdateSummary::default();

    for mut product in products {
        if let Some(only) = options.only {
            if product.id().as_ref() != Some(only) {
                summary.skipped += 1;
                continue;
            }
        }

        write_old_product(out, &product)?;

        let id = match product.require_id() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "cannot update product");
                summary.failed += 1;
                continue;
            }
        };

        if let Err(e) = prepare_product(&mut product, options.assets_dir).await {
            tracing::warn!(product_id = %id, error = %e, "failed to prepare product assets");
            summary.failed += 1;
            continue;
        }

        if options.dry_run {
            writeln!(out, "would update product {id}: {}", redact_payloads(&product))?;
            summary.updated += 1;
            continue;
        }

        match client.update_product(&id, &product).await {
            Ok(UpdateOutcome::Updated(updated)) => {
                writeln!(out, "updated product {id}: {updated}")?;
                summary.updated += 1;
            }
            Ok(UpdateOutcome::Rejected { status, message }) => {
                writeln!(
                    out,
                    "update of product {id} failed: HTTP {status}: {}",
                    message.as_deref().unwrap_or("no message")
                )?;
                summary.failed += 1;
            }
            Err(e) => {
                tracing::warn!(product_id = %id, error = %e, "product update request failed");
                summary.failed += 1;
            }
        }
    }

    if let Some(only) = options.only {
        if summary.skipped > 0 && summary.updated + summary.failed == 0 {
            tracing::warn!(product_id = %only, "no product with this identifier in the collection");
        }
    }

    let verb = if options.dry_run { "would update" } else { "updated" };
    writeln!(
        out,
        "{verb} {}, failed {}, skipped {}",
        summary.updated, summary.failed, summary.skipped
    )?;

    Ok(summary)
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
