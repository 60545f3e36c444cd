//! Build a signed file-download request and print its wire form.
//!
//! Run with: cargo run --package client --example build_request

use anyhow::Result;
use client::{Client, CryptoMaterial};
use envelope::params::field;
use envelope::{testkit, Command, Dialect, ParameterSet, SigningKey};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let material = testkit::generate_key_material();
    let signing_key = SigningKey::from_pem(&material.private_key_pem, &material.certificate_pem)?;

    let params = ParameterSet::new()
        .with(field::CUSTOMER_ID, "11111111")
        .with(field::ENVIRONMENT, "TEST")
        .with(field::TARGET_ID, "11111111A1")
        .with(field::FILE_TYPE, "TITO")
        .with(field::LANGUAGE, "EN");

    let client = Client::new(Command::DownloadFile, Dialect::FileService, params);
    let crypto = CryptoMaterial {
        signing_key: Some(&signing_key),
        ..Default::default()
    };

    let envelope = client.build(&crypto)?;
    println!("{}", envelope.to_xml());
    Ok(())
}
