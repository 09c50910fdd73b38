//! Classificador Naive Bayes multinomial sobre n-gramas de caracteres (1 a 3).
//!
//! Cada palavra é cercada por espaços (" casa ") antes da extração, de modo
//! que prefixos e sufixos viram n-gramas próprios. As probabilidades ficam em
//! log-space com suavização add-1, como nas emissões de um HMM.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{LanguageDetector, DEFAULT_THRESHOLD};
use crate::error::{AnalysisError, Result};
use crate::language::Language;
use crate::store::{load_model, save_model, ModelStore, ModelStoreKey};

const MODEL_KIND: &str = "language-classifier";
const MAX_NGRAM: usize = 3;

/// Sentenças de referência do modelo embutido.
const SEED_SENTENCES: &[(Language, &str)] = &[
    (Language::English, "The government announced that the new policy will be applied across the country next year."),
    (Language::English, "She said the weather would be cold and windy throughout the weekend in the north."),
    (Language::English, "Researchers have found that children who read every day develop stronger language skills."),
    (Language::English, "The company reported higher profits, although its shares fell after the announcement."),
    (Language::English, "We should think about what happened and how they could have avoided those mistakes."),
    (Language::Portuguese, "O governo anunciou que a nova política será aplicada em todo o país no próximo ano."),
    (Language::Portuguese, "Ela disse que o tempo estaria frio e com muito vento durante o fim de semana."),
    (Language::Portuguese, "Os pesquisadores descobriram que as crianças que leem todos os dias falam melhor."),
    (Language::Portuguese, "A empresa informou lucros maiores, mas as ações caíram depois da divulgação."),
    (Language::Portuguese, "A educação e a saúde são questões importantes para a população das regiões do interior."),
    (Language::Spanish, "El gobierno anunció que la nueva política se aplicará en todo el país el próximo año."),
    (Language::Spanish, "Ella dijo que el tiempo estaría frío y con mucho viento durante el fin de semana."),
    (Language::Spanish, "Los investigadores descubrieron que los niños que leen todos los días hablan mejor."),
    (Language::Spanish, "La empresa informó mayores beneficios, pero sus acciones cayeron después del anuncio."),
    (Language::Spanish, "La educación y la salud son cuestiones importantes para la población de los pueblos."),
    (Language::French, "Le gouvernement a annoncé que la nouvelle politique sera appliquée dans tout le pays l'année prochaine."),
    (Language::French, "Elle a dit que le temps serait froid et venteux pendant tout le week-end dans le nord."),
    (Language::French, "Les chercheurs ont découvert que les enfants qui lisent chaque jour parlent mieux."),
    (Language::French, "L'entreprise a publié des bénéfices plus élevés, mais ses actions ont baissé après l'annonce."),
    (Language::French, "Nous devons réfléchir à ce qui s'est passé et comment ils auraient pu éviter ces erreurs."),
    (Language::German, "Die Regierung kündigte an, dass die neue Politik im nächsten Jahr im ganzen Land gelten wird."),
    (Language::German, "Sie sagte, das Wetter werde am Wochenende im Norden kalt und sehr windig sein."),
    (Language::German, "Forscher haben herausgefunden, dass Kinder, die jeden Tag lesen, besser sprechen."),
    (Language::German, "Das Unternehmen meldete höhere Gewinne, aber die Aktien fielen nach der Ankündigung."),
    (Language::German, "Wir sollten darüber nachdenken, was passiert ist und wie man diese Fehler vermeiden kann."),
    (Language::Italian, "Il governo ha annunciato che la nuova politica sarà applicata in tutto il paese il prossimo anno."),
    (Language::Italian, "Lei ha detto che il tempo sarebbe stato freddo e ventoso durante il fine settimana."),
    (Language::Italian, "I ricercatori hanno scoperto che i bambini che leggono ogni giorno parlano meglio."),
    (Language::Italian, "L'azienda ha comunicato utili più alti, ma le azioni sono scese dopo l'annuncio."),
    (Language::Italian, "Dobbiamo pensare a quello che è successo e come avrebbero potuto evitare questi errori."),
    (Language::Dutch, "De regering heeft aangekondigd dat het nieuwe beleid volgend jaar in het hele land geldt."),
    (Language::Dutch, "Ze zei dat het weer in het weekend in het noorden koud en winderig zou zijn."),
    (Language::Dutch, "Onderzoekers hebben ontdekt dat kinderen die elke dag lezen beter leren spreken."),
    (Language::Dutch, "Het bedrijf meldde hogere winsten, maar de aandelen daalden na de aankondiging."),
    (Language::Dutch, "We moeten nadenken over wat er is gebeurd en hoe zij die fouten hadden kunnen vermijden."),
    (Language::Indonesian, "Pemerintah mengumumkan bahwa kebijakan baru akan diterapkan di seluruh negeri tahun depan."),
    (Language::Indonesian, "Dia mengatakan bahwa cuaca akan dingin dan berangin sepanjang akhir pekan di utara."),
    (Language::Indonesian, "Para peneliti menemukan bahwa anak-anak yang membaca setiap hari berbicara lebih baik."),
    (Language::Indonesian, "Perusahaan melaporkan keuntungan yang lebih tinggi, tetapi sahamnya turun setelah pengumuman."),
    (Language::Indonesian, "Kita harus memikirkan apa yang terjadi dan bagaimana mereka bisa menghindari kesalahan itu."),
];

/// Extrai os n-gramas de caracteres (1..=3) de um texto.
fn ngrams(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut grams = Vec::new();

    for word in lower.split(|c: char| !c.is_alphabetic()).filter(|w| !w.is_empty()) {
        let padded: Vec<char> = std::iter::once(' ')
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for n in 1..=MAX_NGRAM {
            for window in padded.windows(n) {
                if n == 1 && window[0] == ' ' {
                    continue;
                }
                grams.push(window.iter().collect());
            }
        }
    }
    grams
}

/// Classificador de idioma treinável e persistível.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgramClassifier {
    languages: Vec<Language>,
    /// Contagem de n-gramas por idioma (mesma ordem de `languages`).
    counts: Vec<HashMap<String, u32>>,
    totals: Vec<u64>,
    vocabulary_size: usize,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl NgramClassifier {
    /// Treina a partir de pares (idioma, texto).
    pub fn train<'a, I>(samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Language, &'a str)>,
    {
        let samples: Vec<(Language, &str)> = samples.into_iter().collect();
        if samples.is_empty() {
            return Err(AnalysisError::invalid_argument("language classifier needs training samples"));
        }
        if let Some((language, _)) = samples.iter().find(|(l, _)| !l.is_concrete()) {
            return Err(AnalysisError::invalid_argument(format!(
                "cannot train language classifier on '{language}'"
            )));
        }

        let classifier = Self::count(samples);
        info!(
            languages = classifier.languages.len(),
            ngrams = classifier.vocabulary_size,
            "language classifier trained"
        );
        Ok(classifier)
    }

    /// Modelo treinado com as sentenças de referência embutidas.
    pub fn pretrained() -> Self {
        Self::count(SEED_SENTENCES.iter().copied())
    }

    fn count<'a>(samples: impl IntoIterator<Item = (Language, &'a str)>) -> Self {
        let mut languages: Vec<Language> = Vec::new();
        let mut counts: Vec<HashMap<String, u32>> = Vec::new();
        let mut vocabulary: HashSet<String> = HashSet::new();

        for (language, text) in samples {
            let slot = match languages.iter().position(|l| *l == language) {
                Some(i) => i,
                None => {
                    languages.push(language);
                    counts.push(HashMap::new());
                    languages.len() - 1
                }
            };
            for gram in ngrams(text) {
                *counts[slot].entry(gram.clone()).or_insert(0) += 1;
                vocabulary.insert(gram);
            }
        }

        let totals = counts.iter().map(|c| c.values().map(|&n| n as u64).sum()).collect();
        Self { languages, counts, totals, vocabulary_size: vocabulary.len(), threshold: DEFAULT_THRESHOLD }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn persist(&self, store: &dyn ModelStore, key: &ModelStoreKey) -> Result<()> {
        save_model(store, key, MODEL_KIND, self)
    }

    pub fn load(store: &dyn ModelStore, key: &ModelStoreKey) -> Result<Self> {
        load_model(store, key, MODEL_KIND)
    }

    /// Log-verossimilhança do texto sob cada idioma.
    fn log_scores(&self, grams: &[String]) -> Vec<f64> {
        let v = self.vocabulary_size as f64;
        self.languages
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let denominator = (self.totals[i] as f64 + v).ln();
                grams
                    .iter()
                    .map(|g| {
                        let count = self.counts[i].get(g).copied().unwrap_or(0) as f64;
                        (count + 1.0).ln() - denominator
                    })
                    .sum()
            })
            .collect()
    }
}

impl LanguageDetector for NgramClassifier {
    fn detect(&self, text: &str) -> Language {
        match self.detect_all(text).first() {
            Some(&(language, p)) if p >= self.threshold => language,
            _ => Language::Unknown,
        }
    }

    /// Posteriores (softmax das log-verossimilhanças, prior uniforme).
    fn detect_all(&self, text: &str) -> Vec<(Language, f64)> {
        let grams = ngrams(text);
        if grams.is_empty() {
            return Vec::new();
        }

        let scores = self.log_scores(&grams);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exp.iter().sum();

        let mut ranked: Vec<(Language, f64)> = self
            .languages
            .iter()
            .zip(exp)
            .map(|(&language, e)| (language, e / sum))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}
