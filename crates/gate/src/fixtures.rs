//! A deterministic sample article for tests and dry runs.
//!
//! The default fixture scores 100/100 against the default rubric. Each
//! builder switch introduces exactly one kind of violation, and the body is
//! padded with unique filler paragraphs to hit an exact word count.

use crate::article::count_words;
use crate::{Article, Keyword, TargetWordCount};

/// The phrase used as the main keyword by [`ArticleFixture::with_keyword`].
pub const FIXTURE_KEYWORD: &str = "ρήξη μηνίσκου";

const TITLE: &str = "# Ρήξη μηνίσκου: αίτια και αντιμετώπιση";

const INTRO: &str = "Η **ρήξη μηνίσκου** είναι ένας από τους συχνότερους τραυματισμούς του γόνατος. \
Η επέμβαση περιλαμβάνει σύγχρονες αρθροσκοπικές τεχνικές.";

const ANATOMY: &str = "## Ανατομία του γόνατος\n\n\
Ο μηνίσκος (ένας ινοχόνδρινος δίσκος σε σχήμα μισοφέγγαρου) απορροφά τους κραδασμούς της άρθρωσης. \
Κάθε γόνατο διαθέτει έσω και έξω μηνίσκο.";

const SYMPTOMS: &str = "## Συμπτώματα\n\n\
Τα συνήθη συμπτώματα είναι πόνος, οίδημα και δυσκολία στην έκταση του γόνατος. \
Ο κλινικός έλεγχος εντοπίζει το πρόβλημα στα περισσότερα περιστατικά.";

const DIAGNOSIS: &str = "## Διάγνωση\n\n\
Η μαγνητική τομογραφία επιβεβαιώνει τη διάγνωση. \
Ο ιατρικός φάκελος καταγράφει τους προηγούμενους τραυματισμούς.\n\n\
- Μαγνητική τομογραφία\n\
- Κλινικές δοκιμασίες\n\
- Ακτινογραφία";

const TREATMENT_HEAD: &str = "## Θεραπεία\n\n\
Ο χειρουργικός καθαρισμός εφαρμόζει ελάχιστα επεμβατική τεχνική. \
Τα ποσοστά επιτυχίας κυμαίνονται στο 75-85% των περιπτώσεων.";

const DISCLAIMER: &str = "Η τελική έκβαση διαφέρει από ασθενή σε ασθενή.";

const NO_DISCLAIMER: &str = "Η τελική έκβαση καταγράφεται στον επανέλεγχο.";

const TREATMENT_TAIL: &str = "Η θεραπεία ακολουθεί πρωτόκολλα του VCU Medical Center.";

const REHABILITATION: &str = "## Αποκατάσταση\n\n\
Το πρόγραμμα φυσικοθεραπείας διαρκεί συνήθως έξι εβδομάδες. \
Το πρωτόκολλο αποκατάστασης βασίζεται σε οδηγίες του Leeds Hospital.";

const FIRST_PERSON: &str = "Πιστεύω ότι η ανάρρωση εξελίσσεται σταθερά. \
Νομίζω ότι ο ρυθμός είναι ικανοποιητικός.";

const ANECDOTE: &str = "Οι προσωπικές ιστορίες των ασθενών δεν αποτελούν απόδειξη. \
Τα συναισθήματα επηρεάζουν την ανάρρωση.";

fn filler(index: u32) -> String {
    format!(
        "Σημείωση {index}: η πορεία της αποκατάστασης παρακολουθείται σε τακτά διαστήματα. \
Ο έλεγχος {index} καταγράφει την κινητικότητα της άρθρωσης. \
Η αξιολόγηση {index} ολοκληρώνεται πριν από το επόμενο στάδιο."
    )
}

/// Two sentences totalling `words` words (at least two).
fn padding(words: u32) -> String {
    let first = words.div_ceil(2);
    let second = words - first;
    let sentence = |word: &str, n: u32| vec![word; n as usize].join(" ");
    format!("{}. {}.", sentence("συμπλήρωμα", first), sentence("παράρτημα", second))
}

/// Builder for the sample article.
#[derive(Debug, Clone)]
pub struct ArticleFixture {
    target: TargetWordCount,
    words: Option<u32>,
    keyword: bool,
    first_person: bool,
    anecdote: bool,
    disclaimer: bool,
    repeated_paragraphs: u32,
}

impl ArticleFixture {
    /// A clean article aimed at `target` words and padded to exactly that.
    pub fn new(target: TargetWordCount) -> Self {
        Self {
            target,
            words: None,
            keyword: false,
            first_person: false,
            anecdote: false,
            disclaimer: true,
            repeated_paragraphs: 0,
        }
    }

    /// Pads to `words` instead of the target.
    ///
    /// The count is exact unless it is below the unpadded article or exactly
    /// one word above it; then the article is as close as it can get.
    #[must_use]
    pub fn with_word_count(mut self, words: u32) -> Self {
        self.words = Some(words);
        self
    }

    /// Sets [`FIXTURE_KEYWORD`] as the main keyword.
    #[must_use]
    pub fn with_keyword(mut self) -> Self {
        self.keyword = true;
        self
    }

    #[must_use]
    pub fn with_first_person(mut self) -> Self {
        self.first_person = true;
        self
    }

    #[must_use]
    pub fn with_anecdote(mut self) -> Self {
        self.anecdote = true;
        self
    }

    #[must_use]
    pub fn without_disclaimer(mut self) -> Self {
        self.disclaimer = false;
        self
    }

    /// Repeats the introduction `count` more times.
    #[must_use]
    pub fn with_repeated_paragraphs(mut self, count: u32) -> Self {
        self.repeated_paragraphs = count;
        self
    }

    pub fn markdown(&self) -> String {
        let mut blocks: Vec<String> = vec![TITLE.to_string(), INTRO.to_string()];
        for _ in 0..self.repeated_paragraphs {
            blocks.push(INTRO.to_string());
        }
        blocks.push(ANATOMY.to_string());
        blocks.push(SYMPTOMS.to_string());
        blocks.push(DIAGNOSIS.to_string());
        let closing = if self.disclaimer { DISCLAIMER } else { NO_DISCLAIMER };
        blocks.push(format!("{TREATMENT_HEAD} {closing} {TREATMENT_TAIL}"));
        blocks.push(REHABILITATION.to_string());
        if self.first_person {
            blocks.push(FIRST_PERSON.to_string());
        }
        if self.anecdote {
            blocks.push(ANECDOTE.to_string());
        }

        let wanted = self.words.unwrap_or(self.target.as_u32());
        let current = count_words(&blocks.join("\n\n")).as_u32();
        if wanted > current {
            let per_filler = count_words(&filler(1)).as_u32();
            let remaining = wanted - current;
            let mut fillers = remaining / per_filler;
            let mut rest = remaining % per_filler;
            if rest == 1 && fillers > 0 {
                fillers -= 1;
                rest += per_filler;
            }
            for index in 1..=fillers {
                blocks.push(filler(index));
            }
            if rest > 0 {
                blocks.push(padding(rest.max(2)));
            }
        }

        let mut markdown = blocks.join("\n\n");
        markdown.push('\n');
        markdown
    }

    pub fn build(&self) -> Article {
        let keyword = if self.keyword {
            Keyword::new(FIXTURE_KEYWORD)
        } else {
            None
        };
        Article::from_markdown(self.markdown(), self.target).with_main_keyword(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(n: u32) -> TargetWordCount {
        TargetWordCount::new(n).unwrap()
    }

    #[test]
    fn test_fixture_hits_exact_word_count() {
        for words in [400, 401, 427, 1000, 1700, 2000] {
            let article = ArticleFixture::new(target(2000)).with_word_count(words).build();
            assert_eq!(article.word_count().as_u32(), words, "requested {words}");
        }
    }

    #[test]
    fn test_fixture_defaults_to_target() {
        let article = ArticleFixture::new(target(1500)).build();
        assert_eq!(article.word_count().as_u32(), 1500);
        assert_eq!(article.section_headings().count(), 5);
        assert!(article.main_keyword().is_none());
    }

    #[test]
    fn test_padding_splits_words() {
        assert_eq!(count_words(&padding(2)).as_u32(), 2);
        assert_eq!(count_words(&padding(7)).as_u32(), 7);
    }
}
