//! # Definição de Erros do Domínio de Transformação
//!
//! Este módulo centraliza as falhas possíveis durante a etapa de transformação (ETL).
//!
//! # Error Handling Strategy
//! - **Tipagem:** Enums para tratamento exaustivo.
//! - **Extensibilidade:** Marcado como `non_exhaustive` para permitir evolução sem quebra de contrato.
//! - **Taxonomia:** Defeitos ao nível do documento (id ausente, timestamp inválido, duplicado)
//!   NÃO passam por aqui — são diagnósticos recuperáveis, ver `records::SkippedRecord`.
//!   Apenas defeitos ao nível do lote (estrutura malformada, falha de escrita) viram erro.

/// Enumeração central de falhas da etapa de Transformação.
///
/// O atributo `#[non_exhaustive]` garante compatibilidade futura,
/// instruindo o compilador a exigir tratamento de variantes desconhecidas.
#[derive(Debug)]
#[non_exhaustive]
pub enum TransformError {
    /// Falhas no sistema de arquivos (permissão, disco cheio, arquivo inexistente).
    /// Encapsula `std::io::Error`.
    Io(std::io::Error),

    /// Encapsula `serde_json::Error`.
    Json(serde_json::Error),

    /// Erros originados na engine colunar (montagem do DataFrame, escrita Parquet).
    /// Armazenados como `String` para reduzir acoplamento direto.
    Parquet(String),

    /// Violações estruturais nos dados brutos (ex: resposta da API sem `items`,
    /// documento de vídeo que não é um objeto JSON). Falha o lote inteiro —
    /// a repetição é segura porque a saída é idempotente por chave.
    Schema(String),
}

/// Define erros específicos da camada de API/Rede (etapa de coleta).
#[derive(Debug)]
pub enum ApiError {
    /// Falha na conexão, DNS ou handshake TLS.
    NetworkError(reqwest::Error),

    /// O servidor respondeu, mas com status HTTP de erro.
    HttpStatusError {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Falha ao criar diretórios ou escrever no disco.
    FileSystemError(std::io::Error),

    /// O servidor respondeu com sucesso, mas nenhum byte útil foi recebido.
    EmptyResponse,
}
