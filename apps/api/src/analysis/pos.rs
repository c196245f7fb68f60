//! Rule-based part-of-speech scan.
//!
//! Not a statistical tagger: a closed-class lexicon, capitalization, and a
//! handful of suffix rules. Good enough to pull noun-like tokens out of a
//! resume, which is all the skill extractor needs.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Preposition,
    Conjunction,
    Auxiliary,
    Number,
}

impl PartOfSpeech {
    pub fn is_nominal(self) -> bool {
        matches!(self, PartOfSpeech::Noun | PartOfSpeech::ProperNoun)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedToken<'a> {
    pub text: &'a str,
    pub pos: PartOfSpeech,
}

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "ourselves", "you", "your",
    "yours", "he", "him", "his", "she", "her", "hers", "it", "its", "they", "them", "their",
    "theirs", "who", "whom", "whose", "which", "what", "i'm", "we're", "you're", "it's",
    "they're", "something", "anything", "everything", "nothing", "someone", "anyone",
    "everyone",
];

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "all",
    "no", "both", "either", "neither", "such", "another", "other", "many", "much", "few",
    "several", "more", "most",
];

const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through",
    "during", "before", "after", "above", "below", "to", "from", "up", "down", "of", "off",
    "over", "under", "within", "without", "across", "along", "among", "around", "via", "per",
    "as", "like", "than", "toward", "towards", "upon", "including",
];

const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "if", "because", "while", "although", "though",
    "whereas", "unless", "since", "when", "where", "whether",
];

const AUXILIARIES: &[&str] = &[
    "be", "am", "is", "are", "was", "were", "been", "being", "have", "has", "had", "do",
    "does", "did", "will", "would", "shall", "should", "can", "could", "may", "might", "must",
    "don't", "doesn't", "didn't", "can't", "won't", "isn't", "aren't", "wasn't", "weren't",
];

const ADVERBS: &[&str] = &[
    "not", "also", "very", "well", "too", "just", "only", "then", "there", "here", "now",
    "always", "never", "often", "still", "already", "again", "soon", "even", "ever",
];

const VERBS: &[&str] = &[
    "led", "built", "wrote", "ran", "made", "drove", "grew", "took", "gave", "won", "spent",
    "got", "began", "became", "taught", "brought", "sold", "bought", "held", "kept", "met",
    "told", "thought", "understood", "develop", "implement", "collaborate", "maintain",
    "deliver", "improve", "increase", "reduce", "achieve", "create", "manage", "coordinate",
    "ensure", "enable", "help", "use", "utilize", "leverage", "get", "make", "take", "give",
];

const ADJECTIVES: &[&str] = &[
    "new", "good", "strong", "excellent", "senior", "junior", "large", "small", "high", "low",
    "key", "various", "different", "multiple", "proficient", "skilled", "experienced",
    "familiar", "able", "best", "great", "fast", "full", "remote",
];

/// Words that the suffix rules would misclassify.
const SUFFIX_EXCEPTIONS: &[&str] = &[
    "family", "supply", "assembly", "apply", "reply", "july", "italy", "anomaly", "monopoly",
    "portal", "terminal", "signal", "journal", "manual", "tutorial", "proposal", "approval",
    "interval", "retrieval", "capital", "material", "potential", "hospital", "individual",
    "objective", "executive", "initiative", "archive", "variable", "deliverable", "table",
    "cable", "thing", "string", "king", "ring", "spring", "wing", "need", "speed", "feed",
    "seed", "bed", "red", "social", "global", "rental", "arrival", "festival", "removal",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "al", "less"];

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?P<word>\p{L}[\p{L}\p{N}]*(?:[.'’\-][\p{L}\p{N}]+)*[+#]*)|(?P<num>[0-9]+(?:[.,][0-9]+)*%?)|(?P<brk>[.!?;:\n])",
        )
        .expect("token pattern is valid")
    })
}

/// Tokenizes `text` and tags every word and number. Sentence breaks are consumed, not returned.
pub fn tag(text: &str) -> Vec<TaggedToken<'_>> {
    let mut tokens = Vec::new();
    let mut sentence_start = true;
    let mut previous: Option<PartOfSpeech> = None;

    for caps in token_pattern().captures_iter(text) {
        if caps.name("brk").is_some() {
            sentence_start = true;
            previous = None;
            continue;
        }
        if let Some(num) = caps.name("num") {
            tokens.push(TaggedToken {
                text: num.as_str(),
                pos: PartOfSpeech::Number,
            });
            previous = Some(PartOfSpeech::Number);
            sentence_start = false;
            continue;
        }
        if let Some(word) = caps.name("word") {
            let pos = tag_word(word.as_str(), sentence_start, previous);
            tokens.push(TaggedToken {
                text: word.as_str(),
                pos,
            });
            previous = Some(pos);
            sentence_start = false;
        }
    }

    tokens
}

fn tag_word(word: &str, sentence_start: bool, previous: Option<PartOfSpeech>) -> PartOfSpeech {
    // Typographic apostrophes read like ASCII ones.
    let lower = word.to_lowercase().replace('\u{2019}', "'");

    if let Some(pos) = lookup_closed_class(&lower) {
        return pos;
    }

    if looks_proper(word, sentence_start) {
        return PartOfSpeech::ProperNoun;
    }

    if SUFFIX_EXCEPTIONS.contains(&lower.as_str()) {
        return PartOfSpeech::Noun;
    }

    if lower.len() >= 4 && lower.ends_with("ly") {
        return PartOfSpeech::Adverb;
    }
    if lower.len() >= 4 && lower.ends_with("ed") {
        return PartOfSpeech::Verb;
    }
    if lower.len() >= 5 && lower.ends_with("ing") {
        return match previous {
            Some(PartOfSpeech::Auxiliary | PartOfSpeech::Pronoun) => PartOfSpeech::Verb,
            _ => PartOfSpeech::Noun,
        };
    }
    if lower.len() >= 5
        && ADJECTIVE_SUFFIXES
            .iter()
            .any(|suffix| lower.ends_with(suffix))
    {
        return PartOfSpeech::Adjective;
    }

    PartOfSpeech::Noun
}

fn lookup_closed_class(lower: &str) -> Option<PartOfSpeech> {
    let tables: [(&[&str], PartOfSpeech); 8] = [
        (PRONOUNS, PartOfSpeech::Pronoun),
        (DETERMINERS, PartOfSpeech::Determiner),
        (PREPOSITIONS, PartOfSpeech::Preposition),
        (CONJUNCTIONS, PartOfSpeech::Conjunction),
        (AUXILIARIES, PartOfSpeech::Auxiliary),
        (ADVERBS, PartOfSpeech::Adverb),
        (VERBS, PartOfSpeech::Verb),
        (ADJECTIVES, PartOfSpeech::Adjective),
    ];
    tables
        .iter()
        .find(|(words, _)| words.contains(&lower))
        .map(|(_, pos)| *pos)
}

fn looks_proper(word: &str, sentence_start: bool) -> bool {
    if word.contains(['+', '#', '.']) {
        return true;
    }
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase()) {
        return true;
    }
    !sentence_start && word.chars().next().is_some_and(char::is_uppercase)
}
