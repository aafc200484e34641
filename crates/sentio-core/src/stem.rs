//! Porter stemming, NLTK-extensions variant.
//!
//! Reproduces the default mode of NLTK's `PorterStemmer` so that stems line up
//! with vocabularies fitted on NLTK-cleaned text. The differences from the
//! published 1980 algorithm are:
//!
//! - a small pool of irregular forms (`skies` → `sky`, `dying` → `die`, ...)
//! - words of one or two letters are left alone
//! - `-ies` / `-ied` on four-letter words keep the `e` (`dies` → `die`)
//! - step 1c only rewrites `y` after a consonant in a stem longer than one letter
//! - `alli` is tried before the other step 2 rules, `bli` → `ble`, plus
//!   `fulli` → `ful` and `logi` → `log`
//! - a two-letter vowel-consonant stem counts as ending in cvc
//!
//! Operates on lowercase ASCII words. Anything containing other characters is
//! returned lowercased and otherwise untouched.

/// Irregular forms handled by lookup before any suffix stripping.
const IRREGULAR: &[(&str, &str)] = &[
    ("sky", "sky"),
    ("skies", "sky"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("news", "news"),
    ("innings", "inning"),
    ("inning", "inning"),
    ("outings", "outing"),
    ("outing", "outing"),
    ("cannings", "canning"),
    ("canning", "canning"),
    ("howe", "howe"),
    ("proceed", "proceed"),
    ("exceed", "exceed"),
    ("succeed", "succeed"),
];

/// Reduce a single word to its Porter stem.
pub fn stem(word: &str) -> String {
    let word = word.to_lowercase();

    if let Some(&(_, base)) = IRREGULAR.iter().find(|(form, _)| *form == word) {
        return base.to_string();
    }

    if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
        return word;
    }

    let word = step1a(word);
    let word = step1b(word);
    let word = step1c(word);
    let word = step2(word);
    let word = step3(word);
    let word = step4(word);
    let word = step5a(word);
    step5b(word)
}

// ── Letter classes ──

fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of vowel→consonant transitions, the `m` in `[C](VC){m}[V]`.
fn measure(stem: &str) -> usize {
    let w = stem.as_bytes();
    let mut count = 0;
    let mut prev_vowel = false;
    for i in 0..w.len() {
        let consonant = is_consonant(w, i);
        if consonant && prev_vowel {
            count += 1;
        }
        prev_vowel = !consonant;
    }
    count
}

fn contains_vowel(stem: &str) -> bool {
    let w = stem.as_bytes();
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(word: &str) -> bool {
    let w = word.as_bytes();
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

fn ends_cvc(word: &str) -> bool {
    let w = word.as_bytes();
    let n = w.len();
    let classic = n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y');
    let short = n == 2 && !is_consonant(w, 0) && is_consonant(w, 1);
    classic || short
}

/// Apply the first rule whose suffix matches. A matching rule whose condition
/// fails stops the search and leaves the word unchanged.
fn apply_rules(word: String, rules: &[(&str, &str)], cond: impl Fn(&str, &str) -> bool) -> String {
    for &(suffix, replacement) in rules {
        if let Some(stem) = word.strip_suffix(suffix) {
            if cond(stem, suffix) {
                return format!("{stem}{replacement}");
            }
            return word;
        }
    }
    word
}

// ── Steps ──

fn step1a(word: String) -> String {
    if word.len() == 4
        && let Some(stem) = word.strip_suffix("ies")
    {
        return format!("{stem}ie");
    }
    apply_rules(
        word,
        &[("sses", "ss"), ("ies", "i"), ("ss", "ss"), ("s", "")],
        |_, _| true,
    )
}

fn step1b(word: String) -> String {
    if let Some(stem) = word.strip_suffix("ied") {
        let tail = if word.len() == 4 { "ie" } else { "i" };
        return format!("{stem}{tail}");
    }

    if let Some(stem) = word.strip_suffix("eed") {
        if measure(stem) > 0 {
            return format!("{stem}ee");
        }
        return word;
    }

    let Some(stem) = ["ed", "ing"]
        .iter()
        .filter_map(|suffix| word.strip_suffix(suffix))
        .find(|stem| contains_vowel(stem))
    else {
        return word;
    };

    for (suffix, replacement) in [("at", "ate"), ("bl", "ble"), ("iz", "ize")] {
        if let Some(base) = stem.strip_suffix(suffix) {
            return format!("{base}{replacement}");
        }
    }

    if ends_double_consonant(stem) {
        let last = stem.as_bytes()[stem.len() - 1];
        if matches!(last, b'l' | b's' | b'z') {
            return stem.to_string();
        }
        return stem[..stem.len() - 1].to_string();
    }

    if measure(stem) == 1 && ends_cvc(stem) {
        return format!("{stem}e");
    }
    stem.to_string()
}

fn step1c(word: String) -> String {
    if let Some(stem) = word.strip_suffix('y')
        && stem.len() > 1
        && is_consonant(stem.as_bytes(), stem.len() - 1)
    {
        return format!("{stem}i");
    }
    word
}

const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("fulli", "ful"),
    ("logi", "log"),
];

fn step2(word: String) -> String {
    if let Some(stem) = word.strip_suffix("alli")
        && measure(stem) > 0
    {
        return step2(format!("{stem}al"));
    }

    // The `l` of `logi` stays with the stem when measuring, so `geologi` and
    // `theologi` behave alike.
    let len = word.len();
    let with_l = if len >= 3 { word[..len - 3].to_string() } else { String::new() };
    apply_rules(word, STEP2_RULES, |stem, suffix| {
        if suffix == "logi" {
            measure(&with_l) > 0
        } else {
            measure(stem) > 0
        }
    })
}

fn step3(word: String) -> String {
    apply_rules(
        word,
        &[
            ("icate", "ic"),
            ("ative", ""),
            ("alize", "al"),
            ("iciti", "ic"),
            ("ical", "ic"),
            ("ful", ""),
            ("ness", ""),
        ],
        |stem, _| measure(stem) > 0,
    )
}

fn step4(word: String) -> String {
    apply_rules(
        word,
        &[
            ("al", ""),
            ("ance", ""),
            ("ence", ""),
            ("er", ""),
            ("ic", ""),
            ("able", ""),
            ("ible", ""),
            ("ant", ""),
            ("ement", ""),
            ("ment", ""),
            ("ent", ""),
            ("ion", ""),
            ("ou", ""),
            ("ism", ""),
            ("ate", ""),
            ("iti", ""),
            ("ous", ""),
            ("ive", ""),
            ("ize", ""),
        ],
        |stem, suffix| {
            measure(stem) > 1 && (suffix != "ion" || stem.ends_with(['s', 't']))
        },
    )
}

fn step5a(word: String) -> String {
    if let Some(stem) = word.strip_suffix('e') {
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            return stem.to_string();
        }
    }
    word
}

fn step5b(word: String) -> String {
    if word.ends_with("ll") && measure(&word[..word.len() - 1]) > 1 {
        return word[..word.len() - 1].to_string();
    }
    word
}
