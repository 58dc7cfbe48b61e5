//! Candidate name splits
//!
//! Given the text right after a name-introducing phrase ("named", "create",
//! ...), enumerate the ways its leading capitalized words could be read as one
//! card name or a list of card names. Rules text has no schema for this, so the
//! enumeration is generous and the resolver picks among candidates using the
//! [crate::names::NameTable].
//!
//! Given `Example, This and That, Silly, and Serious or Not`, the candidates
//! include the whole phrase as a single name, and every split on "and"/"or"
//! whose left side is further split on commas from the right.

/// One reading of the text: the names it mentions, in order.
pub type Candidate = Vec<String>;

/// Lowercase words allowed inside a single name ("Hivis of the Scale").
const CONNECTORS: &[&str] = &["of", "from", "to", "in", "on", "the", "a"];

/// Punctuation that ends a name.
const NAME_TERMINATORS: &[char] = &[':', '.', '"'];

/// Enumerate candidate splits in preference order.
///
/// `self_names` are the names the text may use for its own card; they matter
/// for "X, X" doubling and for lists whose last entry is the card itself.
pub fn potential_names(text: &str, self_names: &[String]) -> Vec<Candidate> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let Some(first) = words.first() else {
        return Vec::new();
    };
    if first.ends_with(NAME_TERMINATORS) {
        return vec![vec![drop_last_char(first).to_string()]];
    }

    let mut name = first.to_string();
    let mut pending = String::new();
    let mut is_list = false;
    for word in &words[1..] {
        if word.chars().next().is_some_and(char::is_uppercase) {
            name.push_str(&pending);
            name.push(' ');
            name.push_str(word);
            pending.clear();
            if name.ends_with(NAME_TERMINATORS) {
                break;
            }
        } else if CONNECTORS.contains(word) {
            pending.push(' ');
            pending.push_str(word);
        } else if *word == "and" || *word == "or" {
            is_list = true;
            pending.push(' ');
            pending.push_str(word);
        } else {
            break;
        }
    }
    let name = name.trim_end_matches(&[',', '.', ':', '"'][..]).to_string();
    let is_self = |candidate: &str| self_names.iter().any(|n| n == candidate);

    if let Some((left, right)) = name.split_once(", ") {
        if left == right && is_self(left) {
            return vec![vec![left.to_string()]];
        }
    }

    let mut candidates = vec![vec![name.clone()]];
    if is_list {
        for separator in [" and ", " or "] {
            let parts: Vec<&str> = name.split(separator).collect();
            if parts.len() < 2 {
                continue;
            }
            for i in (1..parts.len()).rev() {
                let left = parts[..i].join(separator);
                let right = parts[i..].join(separator);
                let mut left_names: Vec<String> = left.split(", ").map(str::to_string).collect();
                if let Some(last) = left_names.last_mut() {
                    if last.ends_with(',') {
                        last.pop();
                        // ", and SELF" in a two-item list: only the first item is a name
                        if left_names.len() == 1 && is_self(&right) {
                            candidates.push(vec![left_names[0].clone()]);
                        }
                    }
                }
                if left_names.len() > 1 {
                    let mut all = left_names.clone();
                    all.push(right.clone());
                    candidates.push(all);
                    if left_names.len() > 2 {
                        for j in (2..=left_names.len() - 2).rev() {
                            let mut joined = vec![left_names[..j].join(", ")];
                            joined.extend(left_names[j..].iter().cloned());
                            joined.push(right.clone());
                            candidates.push(joined);
                        }
                        let split = left_names.len() - 1;
                        let mut tail = vec![left_names[..split].join(", "), left_names[split].clone()];
                        if !is_self(&right) {
                            tail.push(right.clone());
                        }
                        candidates.push(tail);
                    }
                } else {
                    candidates.push(vec![left, right]);
                }
            }
        }
    } else {
        let mut parts: Vec<&str> = name.split(", ").collect();
        while parts.len() > 1 {
            parts.pop();
            candidates.push(vec![parts.join(", ")]);
        }
    }
    candidates
}

fn drop_last_char(word: &str) -> &str {
    let mut chars = word.chars();
    chars.next_back();
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(candidate: &[&str]) -> Candidate {
        candidate.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_name_stops_at_lowercase_word() {
        let candidates = potential_names("Grizzly Bears, then draw a card.", &[]);
        assert_eq!(candidates, vec![names(&["Grizzly Bears"])]);
    }

    #[test]
    fn connectors_stay_inside_names() {
        let candidates = potential_names("Hivis of the Scale gets +1/+1.", &[]);
        assert_eq!(candidates[0], names(&["Hivis of the Scale"]));
    }

    #[test]
    fn terminal_punctuation_ends_the_name() {
        assert_eq!(
            potential_names("Shock. Then draw.", &[]),
            vec![names(&["Shock"])]
        );
    }

    #[test]
    fn two_item_list_splits_on_and() {
        let candidates = potential_names("Foo and Bar, tapped and attacking.", &[]);
        assert_eq!(
            candidates,
            vec![names(&["Foo and Bar"]), names(&["Foo", "Bar"])]
        );
    }

    #[test]
    fn three_item_list_splits_commas_from_the_right() {
        let candidates = potential_names("Alpha, Beta, and Gamma tokens", &[]);
        assert!(candidates.contains(&names(&["Alpha", "Beta", "Gamma"])));
        assert_eq!(candidates[0], names(&["Alpha, Beta, and Gamma"]));
    }

    #[test]
    fn comma_names_shrink_from_the_right() {
        let candidates = potential_names("Pir, Imaginative Rascal enters", &[]);
        assert_eq!(
            candidates,
            vec![names(&["Pir, Imaginative Rascal"]), names(&["Pir"])]
        );
    }

    #[test]
    fn doubled_self_name_collapses() {
        let self_names = vec!["Borborygmos".to_string()];
        assert_eq!(
            potential_names("Borborygmos, Borborygmos deals damage", &self_names),
            vec![names(&["Borborygmos"])]
        );
    }
}
