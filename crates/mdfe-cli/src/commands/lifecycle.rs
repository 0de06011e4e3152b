//! MDFe lifecycle commands - transmit, query, close, cancel, discard

use std::path::Path;

use anyhow::Result;
use mdfe_client::{MdfeClient, Params};

use super::read_json;
use crate::output::OutputContext;

/// Transmit a new MDFe from a JSON file
pub async fn transmit(
    client: &MdfeClient,
    cnpj: &str,
    data: &Path,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.transmit(cnpj, read_json(data)?, params).await?;
    ctx.print_envelope(&response)
}

/// Show an MDFe
pub async fn query(
    client: &MdfeClient,
    cnpj: &str,
    id: u64,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.query(cnpj, id, params).await?;
    ctx.print_envelope(&response)
}

/// Close an MDFe
pub async fn close(
    client: &MdfeClient,
    cnpj: &str,
    id: u64,
    data: &Path,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.close(cnpj, id, read_json(data)?, params).await?;
    ctx.print_envelope(&response)
}

/// Close an MDFe that was not issued through the API
pub async fn close_external(
    client: &MdfeClient,
    cnpj: &str,
    data: &Path,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.close_external(cnpj, read_json(data)?, params).await?;
    ctx.print_envelope(&response)
}

/// Cancel an MDFe
pub async fn cancel(
    client: &MdfeClient,
    cnpj: &str,
    id: u64,
    data: &Path,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.cancel(cnpj, id, read_json(data)?, params).await?;
    ctx.print_envelope(&response)
}

/// Add a conductor to an MDFe
pub async fn include_conductor(
    client: &MdfeClient,
    cnpj: &str,
    id: u64,
    data: &Path,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client
        .include_conductor(cnpj, id, read_json(data)?, params)
        .await?;
    ctx.print_envelope(&response)
}

/// Discard an MDFe
pub async fn discard(
    client: &MdfeClient,
    cnpj: &str,
    id: u64,
    params: Params,
    ctx: &OutputContext,
) -> Result<()> {
    let response = client.discard(cnpj, id, params).await?;
    ctx.print_envelope(&response)
}
