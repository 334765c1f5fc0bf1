//! Modelos de Dados do Domínio de Trending
//!
//! ## Visão Geral
//! Este módulo define as estruturas que atravessam o pipeline: o lote bruto
//! vindo da API (`Batch`), o registro normalizado pronto para o warehouse
//! (`TrendingRecord`) e os diagnósticos que acompanham cada lote
//! (`SkippedRecord`, `QualityFlag`).
//!
//! ## Boas Práticas
//! - **Imutabilidade**: Um `Batch` nunca é mutado após a construção; é consumido
//!   exatamente uma vez pela normalização.
//! - **Diagnóstico explícito**: Nenhum documento é descartado em silêncio — todo
//!   drop gera um `SkippedRecord` com motivo enumerado.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::errors::TransformError;

/// Documento bruto de um vídeo (um item de `items` na resposta da API).
/// Fraco em tipos por natureza; o acesso seguro fica em `extract`.
pub type RawVideoRecord = Value;

/// Um lote de documentos brutos com o contexto de coleta.
///
/// Criado pelo coletor a partir de UMA resposta da API; `region_code` e
/// `trending_date` vêm do contexto da chamada, nunca dos documentos.
#[derive(Debug, Clone)]
pub struct Batch {
    pub region_code: String,
    pub trending_date: NaiveDate,
    /// Identificador da extração (timestamp UTC), usado na chave do artefato.
    pub source_id: String,
    pub items: Vec<RawVideoRecord>,
}

impl Batch {
    /// Constrói o lote a partir do envelope JSON devolvido pela API.
    ///
    /// # Erros
    /// Retorna `TransformError::Schema` se a resposta não for um objeto JSON
    /// ou se `items` estiver ausente/não for uma lista. Uma lista vazia é
    /// válida (lote com zero registros).
    pub fn from_response(
        resposta: Value,
        region_code: &str,
        trending_date: NaiveDate,
        source_id: &str,
    ) -> Result<Self, TransformError> {
        let raiz = resposta.as_object().ok_or_else(|| {
            TransformError::Schema("resposta da API não é um objeto JSON".to_string())
        })?;

        let items = match raiz.get("items") {
            Some(Value::Array(lista)) => lista.clone(),
            Some(_) => {
                return Err(TransformError::Schema(
                    "campo 'items' não é uma lista".to_string(),
                ));
            }
            None => {
                return Err(TransformError::Schema(
                    "campo 'items' ausente na resposta da API".to_string(),
                ));
            }
        };

        Ok(Self {
            region_code: region_code.to_string(),
            trending_date,
            source_id: source_id.to_string(),
            items,
        })
    }
}

/// Registro normalizado — uma linha por (vídeo, região, data de trending).
///
/// A ordem dos campos espelha a ordem das colunas do artefato Parquet e da
/// tabela de destino no warehouse.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingRecord {
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    /// UTC sem fuso (TIMESTAMP_NTZ no warehouse).
    pub published_at: NaiveDateTime,
    pub duration_seconds: i64,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub category_id: Option<i64>,
    pub region_code: String,
    pub trending_date: NaiveDate,
    pub engagement_rate: f64,
    pub definition: Option<String>,
    pub caption: Option<String>,
}

/// Motivo de descarte de um documento dentro de um lote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `id` ausente ou vazio.
    MissingId,
    /// `snippet.publishedAt` ausente ou fora do ISO-8601 estrito.
    BadTimestamp,
    /// Chave (video_id, região, data) já vista neste lote; o primeiro vence.
    Duplicate,
}

/// Diagnóstico de um documento descartado durante a normalização.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Posição do documento no lote original.
    pub index: usize,
    pub video_id: Option<String>,
    pub reason: SkipReason,
}

/// Aviso de qualidade não-fatal, anexado fora de banda ao lote.
/// Nunca bloqueia a carga; serve apenas para observabilidade a jusante.
#[derive(Debug, Clone, PartialEq)]
pub enum QualityFlag {
    /// Taxa de engajamento truncada para o intervalo [0, 10000].
    ClampedEngagementRate { video_id: String },
    /// Campo ausente ou inválido substituído pelo valor padrão declarado.
    DefaultedField {
        video_id: String,
        field: &'static str,
    },
}

/// Resultado completo da normalização de um lote: registros aceitos mais
/// as duas sequências de diagnóstico (nunca descartadas).
#[derive(Debug, Default)]
pub struct NormalizeOutput {
    pub records: Vec<TrendingRecord>,
    pub skipped: Vec<SkippedRecord>,
    pub flags: Vec<QualityFlag>,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingId => write!(f, "identificador ausente"),
            SkipReason::BadTimestamp => write!(f, "timestamp inválido"),
            SkipReason::Duplicate => write!(f, "duplicado no lote"),
        }
    }
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.video_id {
            Some(id) => write!(f, "doc #{} ({}): {}", self.index, id, self.reason),
            None => write!(f, "doc #{}: {}", self.index, self.reason),
        }
    }
}

impl fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityFlag::ClampedEngagementRate { video_id } => {
                write!(f, "engagement_rate truncado para [0, 10000] (video {})", video_id)
            }
            QualityFlag::DefaultedField { video_id, field } => {
                write!(f, "campo '{}' substituído pelo padrão (video {})", field, video_id)
            }
        }
    }
}
