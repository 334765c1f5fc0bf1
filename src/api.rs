//! Camada de coleta: chamada HTTP ao endpoint de trending e descarga para disco.
//!
//! Colaborador fino do núcleo de transformação — sem retry/backoff aqui; o
//! agendador externo repete o lote inteiro quando necessário.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;

use crate::errors::ApiError;

/// Cria o cliente HTTP reutilizável (keep-alive entre regiões).
pub fn create_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(ApiError::NetworkError)
}

/// Baixa a resposta da API direto para o disco sem carregar na RAM.
///
/// Utiliza `std::io::copy` conectando o fluxo da rede (Response) ao arquivo
/// no disco, com barra de progresso no meio.
///
/// # Arguments
/// * `client` - O cliente HTTP reutilizável.
/// * `url` - A URL completa do endpoint de trending.
/// * `destino` - Onde salvar o JSON cru (ex: `data/raw/US_..._temp.json`).
///
/// # Errors
/// `NetworkError` em falha de conexão, `HttpStatusError` em status não-2xx,
/// `FileSystemError` em falha de escrita e `EmptyResponse` quando o servidor
/// responde sucesso sem nenhum byte.
pub fn fetch_data_to_disk(client: &Client, url: &str, destino: &Path) -> Result<u64, ApiError> {
    // 1. Configura e envia a requisição
    let mut response = client.get(url).send().map_err(ApiError::NetworkError)?;

    if !response.status().is_success() {
        return Err(ApiError::HttpStatusError {
            status: response.status(),
            url: url.to_string(),
        });
    }

    // 2. Prepara a Barra de Progresso
    let total_size = response.content_length().unwrap_or(0);
    let pb = ProgressBar::new(total_size);

    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    pb.set_message(format!("Baixando {}", destino.display()));

    // 3. Cria o arquivo
    let mut arquivo_destino = File::create(destino).map_err(ApiError::FileSystemError)?;

    // 4. Stream: Rede -> Barra -> Disco
    let mut source = pb.wrap_read(&mut response);
    let bytes = io::copy(&mut source, &mut arquivo_destino).map_err(ApiError::FileSystemError)?;

    if bytes == 0 {
        return Err(ApiError::EmptyResponse);
    }

    pb.finish_with_message(format!("Download concluído: {}", destino.display()));

    Ok(bytes)
}
