//! Certificate command - digital certificate registration

use std::path::Path;

use anyhow::{Context, Result};
use mdfe_client::{FilePart, MdfeClient, Params, Payload};

use crate::output::OutputContext;

/// Upload an A1 certificate (.pfx) for the company
pub async fn register_certificate(
    client: &MdfeClient,
    cnpj: &str,
    file: &Path,
    password: &str,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let content = std::fs::read(file)
        .with_context(|| format!("Failed to read certificate {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "certificate.pfx".to_string());

    let payload = Payload::default()
        .with_field("password", password)
        .with_file(FilePart::new("certificate", file_name, content));

    let response = client.register_certificate(cnpj, payload, params).await?;
    ctx.print_envelope(&response)
}
