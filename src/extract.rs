//! # Extração Tipada de Campos
//!
//! ## Visão Geral
//! Acesso seguro a campos aninhados de um documento JSON fracamente tipado,
//! via caminhos pontilhados (ex: `snippet.publishedAt`). Cada função devolve
//! um valor tipado ou o padrão declarado pelo chamador — dados ausentes nunca
//! geram erro aqui.
//!
//! A única exceção é `ensure_document`: um documento cujo topo não é um
//! objeto JSON é defeito estrutural e sobe para o normalizador como fatal.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use crate::errors::TransformError;

/// Navega o caminho pontilhado. Qualquer segmento ausente, nulo ou com tipo
/// incompatível (ex: indexar dentro de uma string) devolve `None`.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut atual = doc;
    for segmento in path.split('.') {
        atual = atual.get(segmento)?;
    }
    (!atual.is_null()).then_some(atual)
}

/// Garante que o topo do documento é um objeto JSON.
///
/// # Erros
/// `TransformError::Schema` caso contrário — este é o único defeito de
/// extração que falha o lote inteiro.
pub fn ensure_document(doc: &Value) -> Result<&serde_json::Map<String, Value>, TransformError> {
    doc.as_object().ok_or_else(|| {
        TransformError::Schema("documento bruto não é um objeto JSON".to_string())
    })
}

/// Extrai uma string; ausência ou tipo incompatível devolve `default`.
pub fn extract_string(doc: &Value, path: &str, default: &str) -> String {
    match lookup(doc, path) {
        Some(Value::String(s)) => s.clone(),
        _ => default.to_string(),
    }
}

/// Interpreta um valor JSON como inteiro. A API devolve contadores como
/// strings ("viewCount": "1000"), então strings numéricas também são aceitas.
pub fn value_as_i64(valor: &Value) -> Option<i64> {
    match valor {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Extrai um número inteiro; falha de parse fecha para `default`.
pub fn extract_number(doc: &Value, path: &str, default: i64) -> i64 {
    lookup(doc, path)
        .and_then(value_as_i64)
        .unwrap_or(default)
}

/// Extrai um timestamp ISO-8601 estrito (RFC 3339), normalizado para UTC sem
/// fuso. Sem coerção de padrão: campos cronológicos nunca são fabricados —
/// `None` significa que o documento deve ser descartado pelo chamador.
pub fn extract_timestamp(doc: &Value, path: &str) -> Option<NaiveDateTime> {
    match lookup(doc, path)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()),
        _ => None,
    }
}

/// Extrai uma duração ISO-8601 (`PnDTnHnMnS`, subconjunto usado pela API) em
/// segundos. Qualquer violação da gramática fecha para `default`, nunca erra.
pub fn extract_duration_seconds(doc: &Value, path: &str, default: i64) -> i64 {
    match lookup(doc, path) {
        Some(Value::String(s)) => parse_iso8601_duration(s).unwrap_or(default),
        _ => default,
    }
}

/// Scanner da gramática `PnDTnHnMnS`. Unidades opcionais, mas a ordem
/// D → H → M → S é obrigatória; sobra de texto invalida o todo.
fn parse_iso8601_duration(texto: &str) -> Option<i64> {
    let resto = texto.strip_prefix('P')?;

    let (parte_dias, parte_tempo) = match resto.split_once('T') {
        Some((d, t)) => (d, t),
        None => (resto, ""),
    };

    let mut total: i64 = 0;

    if !parte_dias.is_empty() {
        let dias = parte_dias.strip_suffix('D')?.parse::<i64>().ok()?;
        total = dias.checked_mul(86_400)?;
    }

    let mut restante = parte_tempo;
    for (unidade, fator) in [('H', 3_600), ('M', 60), ('S', 1)] {
        if let Some(pos) = restante.find(unidade) {
            let (numero, depois) = restante.split_at(pos);
            let valor = numero.parse::<i64>().ok()?;
            total = total.checked_add(valor.checked_mul(fator)?)?;
            restante = &depois[1..];
        }
    }

    if !restante.is_empty() {
        return None;
    }

    (total >= 0).then_some(total)
}
