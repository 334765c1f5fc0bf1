//! # YouTube Trending ETL
//!
//! ## Visão Geral
//! Coleta o snapshot diário de vídeos em trending por região, normaliza o
//! JSON aninhado da API em um schema analítico plano com métricas derivadas
//! de engajamento, e grava o resultado em Parquet para carga em warehouse.
//!
//! ## Princípios de Engenharia
//! - **Resiliência (Fail-Soft)**: Falha em uma região não aborta o pipeline;
//!   dentro de um lote, um documento ruim vira diagnóstico, nunca erro.
//! - **Observabilidade**: Logs com tempos por etapa e resumo
//!   "N aceitos / M ignorados" com motivos enumerados.
//! - **Idempotência**: O artefato de saída é chaveado por (região, data,
//!   extração); reexecução substitui, nunca duplica.

mod api;
mod errors;
mod extract;
mod impl_errors;
mod metrics;
mod models;
mod normalize;
mod records;
mod writer;

use std::env;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{NaiveDate, Utc};

use crate::errors::TransformError;
use crate::models::Config;
use crate::records::Batch;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let global_timer = Instant::now();

    println!("--- YOUTUBE TRENDING ETL ---");

    // Carrega configuração TOML (permite passar caminho via CLI)
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "trending.toml".to_string());

    let config = match Config::load_from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Erro na carga de configuração: {}", e);
            std::process::exit(1);
        }
    };

    // A chave da API vem do ambiente, nunca do arquivo
    let api_key = match env::var(&config.api_key_env) {
        Ok(k) if !k.is_empty() => k,
        _ => {
            eprintln!("Variável de ambiente '{}' ausente ou vazia", config.api_key_env);
            std::process::exit(1);
        }
    };

    // Garante estrutura de pastas: {raiz}/raw
    let raw_dir = config.output_root.join("raw");
    fs::create_dir_all(&raw_dir)?;

    // Reuso de conexões/Keep-alive para performance
    let client = api::create_http_client()?;

    // Contexto do lote: data de trending e id da extração (timestamp UTC)
    let agora = Utc::now();
    let trending_date = agora.date_naive();
    let source_id = agora.format("%Y-%m-%dT%H-%M-%SZ").to_string();

    for region in &config.regions {
        let step_timer = Instant::now();
        println!("\n Região: {}", region);

        let url = config.trending_url(region, &api_key);
        let path_json = raw_dir.join(format!("{}_{}_temp.json", region, source_id));

        if let Err(e) = api::fetch_data_to_disk(&client, &url, &path_json) {
            eprintln!("Falha no Download: {}", e);
            continue;
        }

        match transform_region(&config, region, trending_date, &source_id, &path_json) {
            Ok((aceitos, ignorados, destino)) => {
                println!(
                    "Sucesso: {} aceitos / {} ignorados -> {} ({:.2?})",
                    aceitos,
                    ignorados,
                    destino.display(),
                    step_timer.elapsed()
                );
                // Temporário removido apenas após o sucesso da escrita
                if let Err(e) = fs::remove_file(&path_json) {
                    eprintln!("Aviso: falha ao remover temporário: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Falha na Transformação: {}", e);
            }
        }
    }

    println!("\n==========================================");
    println!("Fim da coleta e transformação de trending");
    println!(
        "Tempo de execução: {:.2?}",
        global_timer.elapsed()
    );
    println!("==========================================");

    Ok(())
}

/// Transforma o JSON bruto de UMA região: lote -> normalização -> Parquet.
///
/// Devolve (aceitos, ignorados, caminho do artefato). Diagnósticos e avisos
/// de qualidade são enumerados no log — nunca descartados em silêncio.
fn transform_region(
    config: &Config,
    region: &str,
    trending_date: NaiveDate,
    source_id: &str,
    path_json: &Path,
) -> Result<(usize, usize, PathBuf), TransformError> {
    let file = File::open(path_json).map_err(TransformError::Io)?;
    let resposta: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;

    let batch = Batch::from_response(resposta, region, trending_date, source_id)?;
    let saida = normalize::normalize_batch(&batch)?;

    for ignorado in &saida.skipped {
        println!("  Ignorado: {}", ignorado);
    }
    for aviso in &saida.flags {
        println!("  Qualidade: {}", aviso);
    }

    let destino = writer::write_batch(&config.output_root, &batch, &saida.records)?;

    Ok((saida.records.len(), saida.skipped.len(), destino))
}
