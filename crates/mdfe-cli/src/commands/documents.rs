//! Document commands - DAMDFE, XML, cancellation PDF and pre-print

use std::path::Path;

use anyhow::Result;
use mdfe_client::{MdfeClient, Params};

use super::read_json;
use crate::output::OutputContext;

/// Download the DAMDFE PDF
pub async fn print_damdfe(
    client: &MdfeClient,
    cnpj: &str,
    id: u64,
    out: Option<&Path>,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.print_damdfe(cnpj, id, params).await?;
    ctx.save_document(&response, out)
}

/// Download the authorized XML
pub async fn fetch_xml(
    client: &MdfeClient,
    cnpj: &str,
    id: u64,
    out: Option<&Path>,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.fetch_xml(cnpj, id, params).await?;
    ctx.save_document(&response, out)
}

/// Download the cancellation PDF
pub async fn print_cancellation(
    client: &MdfeClient,
    cnpj: &str,
    id: u64,
    out: Option<&Path>,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.print_cancellation(cnpj, id, params).await?;
    ctx.save_document(&response, out)
}

/// Render a preview DAMDFE from document data
pub async fn pre_print(
    client: &MdfeClient,
    cnpj: &str,
    data: &Path,
    out: Option<&Path>,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.pre_print(cnpj, read_json(data)?, params).await?;
    ctx.save_document(&response, out)
}
