//! # Escrita Colunar de Lotes
//!
//! ## Engenharia de Dados
//! Serializa o conjunto de registros aceitos de um lote em UM artefato
//! Parquet. O DataFrame é montado por inteiro em memória antes da única
//! chamada de escrita — tudo-ou-nada por lote (tamanho limitado a algumas
//! centenas de registros por região/dia).
//!
//! O caminho de saída é função pura de (região, data de trending, id da
//! extração): reexecutar o mesmo lote substitui o artefato anterior em vez
//! de anexar, mantendo a carga a jusante idempotente.

use polars::io::SerReader;
use polars::prelude::StatisticsOptions;
use polars::prelude::*;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::errors::TransformError;
use crate::records::{Batch, TrendingRecord};

/// Caminho do artefato: `{raiz}/processed/{região}/{data}/{source_id}.parquet`.
pub fn artifact_path(output_root: &Path, batch: &Batch) -> PathBuf {
    output_root
        .join("processed")
        .join(&batch.region_code)
        .join(batch.trending_date.to_string())
        .join(format!("{}.parquet", batch.source_id))
}

/// Escreve o lote como Parquet e devolve o caminho do artefato.
///
/// # Erros
/// `TransformError::Io` em falha de disco, `TransformError::Parquet` em
/// falha da engine. Sempre seguro repetir o lote inteiro.
pub fn write_batch(
    output_root: &Path,
    batch: &Batch,
    registros: &[TrendingRecord],
) -> Result<PathBuf, TransformError> {
    // Montagem completa ANTES de tocar no disco.
    let mut dataframe = dataframe_from_records(registros)?;

    let destino = artifact_path(output_root, batch);
    if let Some(pai) = destino.parent() {
        fs::create_dir_all(pai).map_err(TransformError::Io)?;
    }

    // File::create trunca: reescrita substitui, nunca anexa.
    let file_out = File::create(&destino).map_err(TransformError::Io)?;

    let stats_options = StatisticsOptions {
        min_value: true,
        max_value: true,
        null_count: true,
        distinct_count: false,
    };

    ParquetWriter::new(file_out)
        .with_compression(ParquetCompression::Snappy)
        .with_statistics(stats_options)
        .finish(&mut dataframe)
        .map_err(|e| TransformError::Parquet(format!("erro ao gravar Parquet: {}", e)))?;

    Ok(destino)
}

/// Lê um artefato de volta para um DataFrame (verificação e testes).
pub fn read_artifact(caminho: &Path) -> Result<DataFrame, TransformError> {
    let file = File::open(caminho).map_err(TransformError::Io)?;
    ParquetReader::new(file)
        .finish()
        .map_err(|e| TransformError::Parquet(format!("erro ao ler Parquet: {}", e)))
}

/// Monta o DataFrame com ordem de colunas fixa, espelhando a tabela de
/// destino no warehouse.
fn dataframe_from_records(registros: &[TrendingRecord]) -> Result<DataFrame, TransformError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();

    let published_ms: Vec<i64> = registros
        .iter()
        .map(|r| r.published_at.and_utc().timestamp_millis())
        .collect();
    let trending_dias: Vec<i32> = registros
        .iter()
        .map(|r| (r.trending_date - epoch).num_days() as i32)
        .collect();

    let colunas = vec![
        Column::new(
            "video_id".into(),
            registros.iter().map(|r| r.video_id.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "title".into(),
            registros.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(
            "channel_title".into(),
            registros.iter().map(|r| r.channel_title.as_str()).collect::<Vec<_>>(),
        ),
        Column::new("published_at".into(), published_ms)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        Column::new(
            "duration_seconds".into(),
            registros.iter().map(|r| r.duration_seconds).collect::<Vec<i64>>(),
        ),
        Column::new(
            "views".into(),
            registros.iter().map(|r| r.views).collect::<Vec<i64>>(),
        ),
        Column::new(
            "likes".into(),
            registros.iter().map(|r| r.likes).collect::<Vec<i64>>(),
        ),
        Column::new(
            "comments".into(),
            registros.iter().map(|r| r.comments).collect::<Vec<i64>>(),
        ),
        Column::new(
            "category_id".into(),
            registros.iter().map(|r| r.category_id).collect::<Vec<Option<i64>>>(),
        ),
        Column::new(
            "region_code".into(),
            registros.iter().map(|r| r.region_code.as_str()).collect::<Vec<_>>(),
        ),
        Column::new("trending_date".into(), trending_dias).cast(&DataType::Date)?,
        Column::new(
            "engagement_rate".into(),
            registros.iter().map(|r| r.engagement_rate).collect::<Vec<f64>>(),
        ),
        Column::new(
            "definition".into(),
            registros.iter().map(|r| r.definition.clone()).collect::<Vec<Option<String>>>(),
        ),
        Column::new(
            "caption".into(),
            registros.iter().map(|r| r.caption.clone()).collect::<Vec<Option<String>>>(),
        ),
    ];

    DataFrame::new(colunas)
        .map_err(|e| TransformError::Parquet(format!("erro ao montar DataFrame: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use std::env;

    fn registro(id: &str, views: i64) -> TrendingRecord {
        TrendingRecord {
            video_id: id.to_string(),
            title: format!("título de {}", id),
            channel_title: "Canal".to_string(),
            published_at: NaiveDateTime::parse_from_str("2024-12-30 08:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            duration_seconds: 933,
            views,
            likes: 50,
            comments: 10,
            category_id: Some(10),
            region_code: "US".to_string(),
            trending_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            engagement_rate: 6.0,
            definition: Some("hd".to_string()),
            caption: None,
        }
    }

    fn lote_teste(source_id: &str) -> Batch {
        Batch {
            region_code: "US".to_string(),
            trending_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            source_id: source_id.to_string(),
            items: vec![],
        }
    }

    fn raiz_temporaria(nome: &str) -> PathBuf {
        env::temp_dir().join(format!("yt_trending_{}_{}", nome, std::process::id()))
    }

    #[test]
    fn caminho_e_funcao_pura_dos_metadados() {
        let raiz = PathBuf::from("data");
        let a = artifact_path(&raiz, &lote_teste("t0"));
        let b = artifact_path(&raiz, &lote_teste("t0"));
        assert_eq!(a, b);
        assert_eq!(
            a,
            PathBuf::from("data/processed/US/2025-01-01/t0.parquet")
        );
    }

    #[test]
    fn ida_e_volta_preserva_os_registros() {
        let raiz = raiz_temporaria("roundtrip");
        let lote = lote_teste("t0");
        let registros = vec![registro("vid1", 1000), registro("vid2", 0)];

        let destino = write_batch(&raiz, &lote, &registros).unwrap();
        let df = read_artifact(&destino).unwrap();

        assert_eq!(df.shape(), (2, 14));
        assert_eq!(
            df.get_column_names_str(),
            vec![
                "video_id",
                "title",
                "channel_title",
                "published_at",
                "duration_seconds",
                "views",
                "likes",
                "comments",
                "category_id",
                "region_code",
                "trending_date",
                "engagement_rate",
                "definition",
                "caption"
            ]
        );

        let ids = df.column("video_id").unwrap().as_materialized_series().clone();
        assert_eq!(ids.str().unwrap().get(0), Some("vid1"));
        assert_eq!(ids.str().unwrap().get(1), Some("vid2"));

        let views = df.column("views").unwrap().as_materialized_series().clone();
        assert_eq!(views.i64().unwrap().get(0), Some(1000));
        assert_eq!(views.i64().unwrap().get(1), Some(0));

        let taxa = df.column("engagement_rate").unwrap().as_materialized_series().clone();
        assert_eq!(taxa.f64().unwrap().get(0), Some(6.0));

        let publicado = df.column("published_at").unwrap().as_materialized_series().clone();
        assert_eq!(
            publicado.datetime().unwrap().get(0),
            Some(
                registro("vid1", 0)
                    .published_at
                    .and_utc()
                    .timestamp_millis()
            )
        );

        let caption = df.column("caption").unwrap().as_materialized_series().clone();
        assert_eq!(caption.str().unwrap().get(0), None);

        let _ = std::fs::remove_dir_all(&raiz);
    }

    #[test]
    fn reescrita_substitui_o_artefato() {
        let raiz = raiz_temporaria("idempotente");
        let lote = lote_teste("t0");

        let primeiro = write_batch(&raiz, &lote, &[registro("vid1", 10), registro("vid2", 20)]).unwrap();
        let segundo = write_batch(&raiz, &lote, &[registro("vid1", 10)]).unwrap();

        // mesma chave -> mesmo caminho, conteúdo substituído (não anexado)
        assert_eq!(primeiro, segundo);
        let df = read_artifact(&segundo).unwrap();
        assert_eq!(df.height(), 1);

        let _ = std::fs::remove_dir_all(&raiz);
    }

    #[test]
    fn lote_vazio_gera_artefato_com_zero_linhas() {
        let raiz = raiz_temporaria("vazio");
        let destino = write_batch(&raiz, &lote_teste("t0"), &[]).unwrap();
        let df = read_artifact(&destino).unwrap();
        assert_eq!(df.shape(), (0, 14));

        let _ = std::fs::remove_dir_all(&raiz);
    }
}
