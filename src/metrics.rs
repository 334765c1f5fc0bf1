//! Cálculo de métricas derivadas de engajamento.
//!
//! Funções puras sobre contadores já extraídos; nenhum acesso a JSON aqui.

/// Taxa de engajamento: `(likes + comments) / views * 100`, arredondada a
/// 3 casas decimais e truncada para `[0, 10000]`.
///
/// Devolve `(taxa, truncada)`. O booleano indica que o valor bruto caiu fora
/// do intervalo (contadores patológicos ou corrompidos) e virou aviso de
/// qualidade — nunca rejeição. Zero views é caso legítimo (vídeo recém em
/// trending) e devolve exatamente `0.0` sem aviso. NaN/∞ nunca escapam.
pub fn engagement_rate(likes: i64, comments: i64, views: i64) -> (f64, bool) {
    if views <= 0 {
        return (0.0, false);
    }

    let bruto = likes.saturating_add(comments) as f64 / views as f64 * 100.0;
    if !bruto.is_finite() {
        return (0.0, true);
    }

    let arredondado = (bruto * 1000.0).round() / 1000.0;
    if arredondado < 0.0 {
        (0.0, true)
    } else if arredondado > 10_000.0 {
        (10_000.0, true)
    } else {
        (arredondado, false)
    }
}
