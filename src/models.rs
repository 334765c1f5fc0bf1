//! Modelos de Configuração do Pipeline
//!
//! ## Visão Geral
//! Este módulo define a configuração do pipeline de trending: endpoint base,
//! regiões a coletar e raiz de saída. A chave da API NUNCA fica no arquivo —
//! o TOML declara apenas o NOME da variável de ambiente que a contém.
//!
//! ## Boas Práticas
//! - **Encapsulamento**: Validações de integridade ocorrem no momento da carga.
//! - **Estado explícito**: A configuração é um valor passado por referência ao
//!   coletor e ao escritor; nenhum estado global mutável.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::TransformError;

/// Configuração carregada do TOML.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Ponto de entrada base da API (ex: https://www.googleapis.com/youtube/v3).
    pub base_url: String,

    /// Nome da variável de ambiente que contém a chave da API.
    pub api_key_env: String,

    /// Códigos de região ISO 3166-1 alpha-2 a coletar (ex: "US", "BR").
    pub regions: Vec<String>,

    /// Máximo de vídeos por região por chamada.
    #[serde(default = "max_results_padrao")]
    pub max_results: u32,

    /// Raiz física de saída (subpastas `raw/` e `processed/`).
    #[serde(default = "output_root_padrao")]
    pub output_root: PathBuf,
}

fn max_results_padrao() -> u32 {
    50
}

fn output_root_padrao() -> PathBuf {
    PathBuf::from("data")
}

impl Config {
    /// Carrega e valida o ficheiro de configuração TOML.
    ///
    /// # Erros
    /// Retorna `TransformError::Io` se o ficheiro não for encontrado ou
    /// `TransformError::Schema` se a estrutura for inválida.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TransformError> {
        let content = fs::read_to_string(path).map_err(TransformError::Io)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| TransformError::Schema(format!("Erro no TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validação pós-carga (Fail-Fast).
    fn validate(&self) -> Result<(), TransformError> {
        if self.base_url.is_empty() {
            return Err(TransformError::Schema("base_url vazia".to_string()));
        }
        if self.api_key_env.is_empty() {
            return Err(TransformError::Schema("api_key_env vazia".to_string()));
        }
        if self.regions.is_empty() {
            return Err(TransformError::Schema("nenhuma região configurada".to_string()));
        }
        for region in &self.regions {
            if region.len() != 2 || !region.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(TransformError::Schema(format!(
                    "região inválida: '{}' (esperado código de 2 letras maiúsculas)",
                    region
                )));
            }
        }
        if self.max_results == 0 || self.max_results > 50 {
            return Err(TransformError::Schema(format!(
                "max_results fora do intervalo [1, 50]: {}",
                self.max_results
            )));
        }
        Ok(())
    }

    /// Resolve a URL completa do endpoint de trending para uma região.
    pub fn trending_url(&self, region: &str, api_key: &str) -> String {
        format!(
            "{}/videos?part=snippet%2CcontentDetails%2Cstatistics&chart=mostPopular&maxResults={}&regionCode={}&key={}",
            self.base_url.trim_end_matches('/'),
            self.max_results,
            region,
            api_key
        )
    }
}
