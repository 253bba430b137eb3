//! Note micro-token parsing — splits the fused tail of a note call like
//! `c4!` or `d___` into accidental markers and a duration token.

/// Split a note-call suffix into `(accidentals, duration)`.
///
/// The tail is scanned right to left:
/// - a final `!` becomes a `+` (sharp) accidental, a final `?` a `-` (flat);
/// - then a run of 0–3 underscores: 0 → nothing, 1 → `_` (natural),
///   2 → slur, 3 → natural + slur;
/// - whatever remains is the duration token. A slur appends `~` to it.
pub fn parse_suffix(suffix: &str) -> (String, String) {
    let mut rest = suffix;
    let mut accidentals = String::new();

    if let Some(stripped) = rest.strip_suffix('!') {
        accidentals.push('+');
        rest = stripped;
    } else if let Some(stripped) = rest.strip_suffix('?') {
        accidentals.push('-');
        rest = stripped;
    }

    let mut underscores = 0;
    while underscores < 3 {
        match rest.strip_suffix('_') {
            Some(stripped) => {
                underscores += 1;
                rest = stripped;
            }
            None => break,
        }
    }

    let mut duration = rest.to_string();
    match underscores {
        0 => {}
        1 => accidentals.push('_'),
        2 => duration.push('~'),
        3 => {
            accidentals.push('_');
            duration.push('~');
        }
        _ => unreachable!(),
    }

    (accidentals, duration)
}
