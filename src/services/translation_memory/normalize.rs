/// Normalização para match exato: caixa baixa, espaços colapsados,
/// pontuação decorativa fora. Placeholders {assim} ficam, porque textos
/// com placeholders diferentes não são a mesma tradução.
pub fn normalize(text: &str) -> String {
    let collapsed = text
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    collapsed
        .chars()
        .filter(|c| !matches!(c, '“' | '”' | '’' | '‘' | '…' | '"' | '\'' | '(' | ')'))
        .collect()
}
