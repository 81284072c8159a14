use crate::args::ReceiptArgs;
use crate::commands::{open_store, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::receipt;
use crate::{utils, Config, Result};
use anyhow::anyhow;
use std::path::PathBuf;

/// Writes the receipt attached to transaction `args.id` to `args.out`. If `args.out` has no
/// extension, one matching the receipt's type is added.
pub async fn receipt(config: Config, args: ReceiptArgs) -> Result<Out<PathBuf>> {
    let store = open_store(&config).await?;
    let transaction = store
        .get(&args.id)
        .ok_or_else(|| anyhow!("There is no transaction with ID {}", args.id))
        .pub_result(ErrorType::Validation)?;
    let data_url = transaction
        .receipt
        .as_deref()
        .ok_or_else(|| anyhow!("Transaction {} has no receipt", args.id))
        .pub_result(ErrorType::Validation)?;
    let decoded = receipt::decode(data_url).pub_result(ErrorType::Validation)?;

    let mut path = args.out;
    if path.extension().is_none() {
        path.set_extension(receipt::extension_for(&decoded.mime));
    }
    utils::write(&path, &decoded.bytes)
        .await
        .pub_result(ErrorType::Export)?;
    let kind = if decoded.is_image() { "image" } else { "document" };
    let message = format!(
        "Saved the {kind} receipt ({}) of {} to {}",
        decoded.mime,
        args.id,
        path.display()
    );
    Ok(Out::new(message, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::login;
    use crate::model::{Amount, Category, NewTransaction};
    use crate::test::TestEnv;
    use chrono::Utc;

    #[tokio::test]
    async fn test_receipt_round_trip_through_store() {
        let env = TestEnv::new().await;
        login(&env.config(), "admin", "admin").await.unwrap();
        let mut store = env.store().await;
        let new = NewTransaction::new(Amount::ZERO, Category::Donation, "Campus Norte", Utc::now())
            .receipt(receipt::encode(std::path::Path::new("r.pdf"), b"%PDF-1.4"));
        let added = store.add(new).unwrap();
        added.write.finish().await.unwrap();

        let args = ReceiptArgs {
            id: added.transaction.id.clone(),
            out: env.config().root().join("saved"),
        };
        let out = receipt(env.config(), args).await.unwrap();
        let path = out.structure().unwrap();
        assert_eq!(path.extension().unwrap(), "pdf");
        assert_eq!(utils::read(path).await.unwrap(), "%PDF-1.4");
        assert!(out.message().starts_with("Saved the document receipt (application/pdf)"));
    }

    #[tokio::test]
    async fn test_image_receipt_keeps_given_extension() {
        let env = TestEnv::new().await;
        login(&env.config(), "admin", "admin").await.unwrap();
        let mut store = env.store().await;
        let new = NewTransaction::new(Amount::ZERO, Category::Fines, "Central", Utc::now())
            .receipt(receipt::encode(std::path::Path::new("foto.png"), &[0x89, b'P', b'N', b'G']));
        let added = store.add(new).unwrap();
        added.write.finish().await.unwrap();

        let args = ReceiptArgs {
            id: added.transaction.id.clone(),
            out: env.config().root().join("recibo.img"),
        };
        let out = receipt(env.config(), args).await.unwrap();
        assert_eq!(out.structure().unwrap().extension().unwrap(), "img");
        assert!(out.message().starts_with("Saved the image receipt (image/png)"));
    }

    #[tokio::test]
    async fn test_receipt_missing() {
        let env = TestEnv::new().await;
        login(&env.config(), "admin", "admin").await.unwrap();
        let args = ReceiptArgs {
            id: "1".to_string(),
            out: env.config().root().join("saved"),
        };
        let err = receipt(env.config(), args).await.unwrap_err();
        assert!(format!("{err:#}").contains("has no receipt"));
    }
}
