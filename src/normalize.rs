//! # Normalização de Lotes
//!
//! ## Engenharia de Dados
//! Converte um `Batch` bruto no conjunto validado de `TrendingRecord`,
//! aplicando a política de padrões por campo e as três regras de descarte:
//! id ausente, timestamp inválido e duplicado dentro do lote.
//!
//! ## Princípios
//! - **Fail-Soft**: Um documento ruim nunca falha o lote; vira diagnóstico.
//! - **Determinismo**: Ordem de entrada preservada; em duplicatas, o primeiro vence.
//! - **Escopo**: A checagem de unicidade é interna ao lote — lotes distintos
//!   (região/data diferentes) são independentes e paralelizáveis sem locks.

use std::collections::HashSet;

use crate::errors::TransformError;
use crate::extract;
use crate::metrics;
use crate::records::{
    Batch, NormalizeOutput, QualityFlag, SkipReason, SkippedRecord, TrendingRecord,
};

const MAX_VIDEO_ID: usize = 20;
const MAX_TITLE: usize = 500;
const MAX_CHANNEL_TITLE: usize = 200;

/// Normaliza um lote inteiro, em ordem de entrada.
///
/// Devolve os registros aceitos e as duas sequências de diagnóstico; o
/// chamador decide o que fazer com elas (aqui, sucesso parcial é sempre
/// aceitável). O único erro fatal é um documento cujo topo não é um objeto
/// JSON — defeito estrutural do lote, seguro de repetir por inteiro.
pub fn normalize_batch(batch: &Batch) -> Result<NormalizeOutput, TransformError> {
    let mut vistos: HashSet<String> = HashSet::new();
    let mut saida = NormalizeOutput::default();

    for (indice, doc) in batch.items.iter().enumerate() {
        extract::ensure_document(doc)
            .map_err(|_| TransformError::Schema(format!("documento #{} não é um objeto JSON", indice)))?;

        // 1. Identificador — único descarte incondicional além do duplicado.
        let video_id = extract::extract_string(doc, "id", "");
        if video_id.is_empty() {
            saida.skipped.push(SkippedRecord {
                index: indice,
                video_id: None,
                reason: SkipReason::MissingId,
            });
            continue;
        }
        let video_id = truncar(video_id, MAX_VIDEO_ID);

        // 2. Timestamp — campos cronológicos nunca são fabricados.
        let Some(published_at) = extract::extract_timestamp(doc, "snippet.publishedAt") else {
            saida.skipped.push(SkippedRecord {
                index: indice,
                video_id: Some(video_id),
                reason: SkipReason::BadTimestamp,
            });
            continue;
        };

        // 3. Escalares com padrões declarados.
        let title = truncar(extract::extract_string(doc, "snippet.title", ""), MAX_TITLE);

        let channel_title = match extract::lookup(doc, "snippet.channelTitle") {
            Some(v) if v.is_string() => {
                truncar(extract::extract_string(doc, "snippet.channelTitle", ""), MAX_CHANNEL_TITLE)
            }
            _ => {
                saida.flags.push(QualityFlag::DefaultedField {
                    video_id: video_id.clone(),
                    field: "channel_title",
                });
                "Unknown".to_string()
            }
        };

        let views = contagem(doc, "statistics.viewCount", &video_id, "views", &mut saida.flags);
        let likes = contagem(doc, "statistics.likeCount", &video_id, "likes", &mut saida.flags);
        let comments = contagem(doc, "statistics.commentCount", &video_id, "comments", &mut saida.flags);

        let category_id = extract::lookup(doc, "snippet.categoryId").and_then(extract::value_as_i64);

        let definition = extract::lookup(doc, "contentDetails.definition")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let caption = extract::lookup(doc, "contentDetails.caption")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        // 4. Métricas derivadas.
        let duration_seconds = extract::extract_duration_seconds(doc, "contentDetails.duration", 0);
        let (engagement_rate, truncada) = metrics::engagement_rate(likes, comments, views);
        if truncada {
            saida.flags.push(QualityFlag::ClampedEngagementRate {
                video_id: video_id.clone(),
            });
        }

        // 5. Unicidade por (video_id, região, data) — região e data são
        // constantes no lote, então o id basta como chave.
        if !vistos.insert(video_id.clone()) {
            saida.skipped.push(SkippedRecord {
                index: indice,
                video_id: Some(video_id),
                reason: SkipReason::Duplicate,
            });
            continue;
        }

        // 6. Emissão.
        saida.records.push(TrendingRecord {
            video_id,
            title,
            channel_title,
            published_at,
            duration_seconds,
            views,
            likes,
            comments,
            category_id,
            region_code: batch.region_code.clone(),
            trending_date: batch.trending_date,
            engagement_rate,
            definition,
            caption,
        });
    }

    Ok(saida)
}

/// Contador não-negativo: ausente ou negativo vira 0 com aviso de qualidade
/// (dados malformados a montante são política de truncamento, não rejeição).
fn contagem(
    doc: &serde_json::Value,
    path: &str,
    video_id: &str,
    field: &'static str,
    flags: &mut Vec<QualityFlag>,
) -> i64 {
    match extract::lookup(doc, path).and_then(extract::value_as_i64) {
        Some(n) if n >= 0 => n,
        _ => {
            flags.push(QualityFlag::DefaultedField {
                video_id: video_id.to_string(),
                field,
            });
            0
        }
    }
}

/// Truncamento seguro em limites de caracteres (nunca corta no meio de um
/// code point multibyte).
fn truncar(texto: String, max: usize) -> String {
    if texto.chars().count() <= max {
        texto
    } else {
        texto.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    fn lote(items: Vec<Value>) -> Batch {
        Batch {
            region_code: "US".to_string(),
            trending_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            source_id: "2025-01-01T00-00-00Z".to_string(),
            items,
        }
    }

    fn doc_valido() -> Value {
        json!({
            "id": "vid_valido",
            "snippet": {
                "title": "Título",
                "channelTitle": "Canal",
                "publishedAt": "2024-12-30T08:00:00Z",
                "categoryId": "10"
            },
            "statistics": { "viewCount": "1000", "likeCount": "50", "commentCount": "10" },
            "contentDetails": { "duration": "PT10M", "definition": "hd", "caption": "false" }
        })
    }

    #[test]
    fn cenario_completo_do_lote() {
        // um válido, um sem id, um duplicado do válido
        let duplicado = json!({
            "id": "vid_valido",
            "snippet": { "title": "Outro título", "publishedAt": "2024-12-31T08:00:00Z", "channelTitle": "Canal 2" },
            "statistics": { "viewCount": "5", "likeCount": "1", "commentCount": "0" }
        });
        let sem_id = json!({ "snippet": { "publishedAt": "2024-12-30T08:00:00Z" } });

        let saida = normalize_batch(&lote(vec![doc_valido(), sem_id, duplicado])).unwrap();

        assert_eq!(saida.records.len(), 1);
        assert_eq!(saida.skipped.len(), 2);
        assert_eq!(saida.skipped[0].reason, SkipReason::MissingId);
        assert_eq!(saida.skipped[1].reason, SkipReason::Duplicate);

        // o primeiro vence: valores vêm do doc original
        let registro = &saida.records[0];
        assert_eq!(registro.video_id, "vid_valido");
        assert_eq!(registro.title, "Título");
        assert_eq!(registro.views, 1000);
        assert_eq!(registro.engagement_rate, 6.0);
        assert_eq!(registro.duration_seconds, 600);
        assert_eq!(registro.category_id, Some(10));
        assert_eq!(registro.region_code, "US");
    }

    #[test]
    fn timestamp_invalido_descarta_com_diagnostico() {
        let mut doc = doc_valido();
        doc["snippet"]["publishedAt"] = json!("ontem de manhã");
        let saida = normalize_batch(&lote(vec![doc])).unwrap();
        assert!(saida.records.is_empty());
        assert_eq!(saida.skipped.len(), 1);
        assert_eq!(saida.skipped[0].reason, SkipReason::BadTimestamp);
        assert_eq!(saida.skipped[0].video_id.as_deref(), Some("vid_valido"));
    }

    #[test]
    fn canal_ausente_recebe_padrao_com_aviso() {
        let mut doc = doc_valido();
        doc["snippet"].as_object_mut().unwrap().remove("channelTitle");
        let saida = normalize_batch(&lote(vec![doc])).unwrap();
        assert_eq!(saida.records[0].channel_title, "Unknown");
        assert!(saida.flags.iter().any(|f| matches!(
            f,
            QualityFlag::DefaultedField { field: "channel_title", .. }
        )));
    }

    #[test]
    fn contadores_negativos_ou_ausentes_viram_zero() {
        let mut doc = doc_valido();
        doc["statistics"]["viewCount"] = json!("-5");
        doc["statistics"].as_object_mut().unwrap().remove("commentCount");
        let saida = normalize_batch(&lote(vec![doc])).unwrap();
        let registro = &saida.records[0];
        assert_eq!(registro.views, 0);
        assert_eq!(registro.comments, 0);
        assert_eq!(registro.likes, 50);
        // views == 0 -> taxa exatamente 0.0
        assert_eq!(registro.engagement_rate, 0.0);
        assert_eq!(
            saida
                .flags
                .iter()
                .filter(|f| matches!(f, QualityFlag::DefaultedField { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn engajamento_patologico_e_truncado_com_aviso() {
        let mut doc = doc_valido();
        doc["statistics"]["viewCount"] = json!("1");
        doc["statistics"]["likeCount"] = json!("9999999");
        let saida = normalize_batch(&lote(vec![doc])).unwrap();
        assert_eq!(saida.records[0].engagement_rate, 10_000.0);
        assert!(saida
            .flags
            .iter()
            .any(|f| matches!(f, QualityFlag::ClampedEngagementRate { .. })));
    }

    #[test]
    fn titulo_longo_e_truncado() {
        let mut doc = doc_valido();
        doc["snippet"]["title"] = json!("x".repeat(600));
        let saida = normalize_batch(&lote(vec![doc])).unwrap();
        assert_eq!(saida.records[0].title.chars().count(), 500);
    }

    #[test]
    fn documento_nao_objeto_falha_o_lote() {
        let erro = normalize_batch(&lote(vec![json!("não sou um objeto")])).unwrap_err();
        assert!(matches!(erro, TransformError::Schema(_)));
    }

    #[test]
    fn lote_vazio_produz_zero_registros() {
        let saida = normalize_batch(&lote(vec![])).unwrap();
        assert!(saida.records.is_empty());
        assert!(saida.skipped.is_empty());
        assert!(saida.flags.is_empty());
    }
}
