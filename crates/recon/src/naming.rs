//! Default-name preference.
//!
//! Each rule that matches a name adds its weight; the higher total is the
//! better default name. The rules prefer TNS-style designations, and a full
//! "AT" designation outranks the same designation without its prefix.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

/// Ordered (pattern, weight) pairs.
pub const NAME_RULES: &[(&str, u32)] = &[
    // starts with a digit (2019abc)
    (r"^[0-9]", 1),
    // non-empty; every name scores it
    (r".$", 1),
    // year-like prefix
    (r"^[0-9]{3}", 1),
    // TNS "AT" prefix
    (r"^AT", 3),
];

fn rules() -> &'static [(Regex, u32)] {
    static RULES: OnceLock<Vec<(Regex, u32)>> = OnceLock::new();
    RULES.get_or_init(|| {
        NAME_RULES
            .iter()
            .filter_map(|(pattern, weight)| Regex::new(pattern).ok().map(|re| (re, *weight)))
            .collect()
    })
}

pub fn score(name: &str) -> u32 {
    rules()
        .iter()
        .filter(|(re, _)| re.is_match(name))
        .map(|(_, w)| w)
        .sum()
}

/// Compare two candidate default names. `Greater` means `a` is preferred.
pub fn compare(a: &str, b: &str) -> Ordering {
    score(a).cmp(&score(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores() {
        assert_eq!(score("2019abc"), 3);
        assert_eq!(score("AT2019abc"), 4);
        assert_eq!(score("ZTF19abzrhgq"), 1);
        assert_eq!(score(""), 0);
    }

    #[test]
    fn tns_number_beats_survey_name() {
        assert_eq!(compare("2019qiz", "ZTF19abzrhgq"), Ordering::Greater);
        assert_eq!(compare("2019abc", "AT2019abc"), Ordering::Less);
        assert_eq!(compare("ASASSN-14li", "PS1-10jh"), Ordering::Equal);
    }
}
