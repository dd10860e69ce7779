use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::terms::{shuffle_terms, SEARCH_TERMS};
use crate::omdb::{MovieOracle, MovieSummary, OmdbError};

pub const DEFAULT_COUNT: usize = 20;
pub const MAX_RANDOM_PAGE: u32 = 3;

/// Which result page to ask the catalog for, per term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStrategy {
    #[default]
    First,
    Random,
}

impl PageStrategy {
    fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        match self {
            PageStrategy::First => 1,
            PageStrategy::Random => rng.gen_range(1..=MAX_RANDOM_PAGE),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub pages: PageStrategy,
    /// Delay between two consecutive catalog queries.
    pub pause: Duration,
    /// How many shuffled terms may be queried at most.
    pub max_terms: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            pages: PageStrategy::Random,
            pause: Duration::from_millis(100),
            max_terms: SEARCH_TERMS.len(),
        }
    }
}

/// Builds deduplicated batches of random movies out of sequential keyword
/// searches. Never fails: a term that errors contributes nothing.
pub struct BatchFetcher {
    oracle: Arc<dyn MovieOracle>,
    rng: Mutex<StdRng>,
    warned_missing_key: AtomicBool,
}

impl BatchFetcher {
    pub fn new(oracle: Arc<dyn MovieOracle>) -> Self {
        Self::with_rng(oracle, StdRng::from_entropy())
    }

    /// Same seed, same term order and pages.
    pub fn with_seed(oracle: Arc<dyn MovieOracle>, seed: u64) -> Self {
        Self::with_rng(oracle, StdRng::seed_from_u64(seed))
    }

    fn with_rng(oracle: Arc<dyn MovieOracle>, rng: StdRng) -> Self {
        Self {
            oracle,
            rng: Mutex::new(rng),
            warned_missing_key: AtomicBool::new(false),
        }
    }

    pub fn oracle(&self) -> &Arc<dyn MovieOracle> {
        &self.oracle
    }

    pub fn has_credential(&self) -> bool {
        self.oracle.has_credential()
    }

    /// Shuffled terms paired with their page. Drawn up front so the rng lock
    /// is never held across an await.
    fn plan(&self, options: &FetchOptions) -> Vec<(&'static str, u32)> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let terms = shuffle_terms(&mut *rng);
        terms
            .into_iter()
            .take(options.max_terms)
            .map(|term| (term, options.pages.pick(&mut *rng)))
            .collect()
    }

    fn warn_missing_key(&self) {
        if !self.warned_missing_key.swap(true, Ordering::Relaxed) {
            warn!("OMDb API key not configured, random batches will be empty");
        }
    }

    pub async fn fetch_batch(&self, count: usize, options: &FetchOptions) -> Vec<MovieSummary> {
        if count == 0 {
            return Vec::new();
        }
        if !self.has_credential() {
            self.warn_missing_key();
            return Vec::new();
        }

        let plan = self.plan(options);
        let mut movies: Vec<MovieSummary> = Vec::with_capacity(count.min(100));
        let mut seen: HashSet<String> = HashSet::new();
        let mut queried = 0;

        for (term, page) in plan {
            if movies.len() >= count {
                break;
            }
            if queried > 0 && !options.pause.is_zero() {
                tokio::time::sleep(options.pause).await;
            }
            queried += 1;

            let results = match self.oracle.search(term, page).await {
                Ok(results) => results,
                Err(OmdbError::NoResults(msg)) => {
                    debug!("No results for term \"{}\" page {}: {}", term, page, msg);
                    continue;
                }
                Err(OmdbError::MissingApiKey) => {
                    self.warn_missing_key();
                    continue;
                }
                Err(e) => {
                    warn!("Error fetching movies for term \"{}\": {}", term, e);
                    continue;
                }
            };

            for movie in results.into_iter().filter(MovieSummary::has_poster) {
                if movies.len() >= count {
                    break;
                }
                if seen.insert(movie.id.clone()) {
                    movies.push(movie);
                }
            }
        }

        info!(
            requested = count,
            returned = movies.len(),
            terms = queried,
            "Fetched random movie batch"
        );

        movies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::omdb::{MovieDetail, OmdbResult};
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn movie(id: &str, poster: &str) -> MovieSummary {
        MovieSummary {
            id: id.to_string(),
            title: format!("Title {}", id),
            year: "2000".to_string(),
            media_type: "movie".to_string(),
            poster_url: poster.to_string(),
        }
    }

    fn with_poster(id: &str) -> MovieSummary {
        movie(id, &format!("https://example.com/{}.jpg", id))
    }

    enum Scripted {
        Hits(Vec<MovieSummary>),
        NoResults,
        Failure,
    }

    /// Answers per term; unknown terms get no results.
    struct ScriptedOracle {
        credential: bool,
        script: HashMap<&'static str, Scripted>,
        calls: Mutex<Vec<(String, u32)>>,
    }

    impl ScriptedOracle {
        fn new(script: HashMap<&'static str, Scripted>) -> Self {
            Self {
                credential: true,
                script,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MovieOracle for ScriptedOracle {
        fn has_credential(&self) -> bool {
            self.credential
        }

        async fn search(&self, term: &str, page: u32) -> OmdbResult<Vec<MovieSummary>> {
            self.calls.lock().unwrap().push((term.to_string(), page));
            match self.script.get(term) {
                Some(Scripted::Hits(movies)) => Ok(movies.clone()),
                Some(Scripted::Failure) => Err(OmdbError::Api {
                    status_code: 503,
                    message: "unavailable".to_string(),
                }),
                Some(Scripted::NoResults) | None => {
                    Err(OmdbError::NoResults("Movie not found!".to_string()))
                }
            }
        }

        async fn lookup(&self, _id: &str) -> OmdbResult<Option<MovieDetail>> {
            Ok(None)
        }
    }

    fn quick() -> FetchOptions {
        FetchOptions {
            pause: Duration::ZERO,
            ..FetchOptions::default()
        }
    }

    fn fetcher(oracle: &Arc<ScriptedOracle>, seed: u64) -> BatchFetcher {
        BatchFetcher::with_seed(oracle.clone() as Arc<dyn MovieOracle>, seed)
    }

    #[tokio::test]
    async fn test_zero_count_skips_oracle() {
        let oracle = Arc::new(ScriptedOracle::new(HashMap::new()));
        let movies = fetcher(&oracle, 1).fetch_batch(0, &quick()).await;
        assert!(movies.is_empty());
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_vocabulary_returns_empty() {
        let script = SEARCH_TERMS
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let answer = if i % 2 == 0 {
                    Scripted::NoResults
                } else {
                    Scripted::Failure
                };
                (*t, answer)
            })
            .collect();
        let oracle = Arc::new(ScriptedOracle::new(script));
        let movies = fetcher(&oracle, 3).fetch_batch(DEFAULT_COUNT, &quick()).await;
        assert!(movies.is_empty());
        assert_eq!(oracle.calls().len(), SEARCH_TERMS.len());
    }

    #[tokio::test]
    async fn test_single_satisfying_term() {
        let hits: Vec<MovieSummary> = (0..25).map(|i| with_poster(&format!("tt{:03}", i))).collect();
        let script = SEARCH_TERMS
            .iter()
            .map(|t| (*t, Scripted::Hits(hits.clone())))
            .collect();
        let oracle = Arc::new(ScriptedOracle::new(script));
        let movies = fetcher(&oracle, 5).fetch_batch(20, &quick()).await;

        assert_eq!(movies, hits[..20].to_vec());
        assert_eq!(oracle.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_dedup_across_terms_keeps_first() {
        let mut script = HashMap::new();
        for t in SEARCH_TERMS {
            let mut shared = with_poster("tt-shared");
            shared.title = t.to_string();
            script.insert(t, Scripted::Hits(vec![shared, with_poster(&format!("tt-{}", t))]));
        }
        let oracle = Arc::new(ScriptedOracle::new(script));
        let movies = fetcher(&oracle, 9).fetch_batch(100, &quick()).await;

        let ids: HashSet<&str> = movies.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), movies.len());
        assert_eq!(movies.len(), SEARCH_TERMS.len() + 1);

        let first_term = &oracle.calls()[0].0;
        let shared = movies.iter().find(|m| m.id == "tt-shared").unwrap();
        assert_eq!(&shared.title, first_term);
    }

    #[tokio::test]
    async fn test_poster_filter() {
        let script = SEARCH_TERMS
            .iter()
            .map(|t| {
                (
                    *t,
                    Scripted::Hits(vec![
                        movie(&format!("{}-none", t), "N/A"),
                        with_poster(&format!("{}-ok", t)),
                    ]),
                )
            })
            .collect();
        let oracle = Arc::new(ScriptedOracle::new(script));
        let movies = fetcher(&oracle, 11).fetch_batch(50, &quick()).await;
        assert_eq!(movies.len(), SEARCH_TERMS.len());
        assert!(movies.iter().all(|m| m.has_poster()));
    }

    #[tokio::test]
    async fn test_bound_holds_for_any_count() {
        let script = SEARCH_TERMS
            .iter()
            .map(|t| {
                let hits = (0..7).map(|i| with_poster(&format!("{}-{}", t, i))).collect();
                (*t, Scripted::Hits(hits))
            })
            .collect::<HashMap<_, _>>();
        let oracle = Arc::new(ScriptedOracle::new(script));
        let f = fetcher(&oracle, 13);
        for count in [0, 1, 6, 7, 8, 20, 139, 140, 141, 500] {
            let movies = f.fetch_batch(count, &quick()).await;
            assert!(movies.len() <= count);
            assert_eq!(movies.len(), count.min(140));
        }
    }

    #[tokio::test]
    async fn test_failing_terms_do_not_abort_batch() {
        let mut script = HashMap::new();
        for (i, t) in SEARCH_TERMS.iter().enumerate() {
            if i % 3 == 0 {
                script.insert(*t, Scripted::Hits(vec![with_poster(t)]));
            } else {
                script.insert(*t, Scripted::Failure);
            }
        }
        let oracle = Arc::new(ScriptedOracle::new(script));
        let movies = fetcher(&oracle, 17).fetch_batch(20, &quick()).await;
        assert_eq!(movies.len(), 7);
    }

    #[tokio::test]
    async fn test_credential_absent() {
        let mut oracle = ScriptedOracle::new(HashMap::new());
        oracle.credential = false;
        let oracle = Arc::new(oracle);
        let f = fetcher(&oracle, 19);
        assert!(!f.has_credential());
        assert!(f.fetch_batch(20, &quick()).await.is_empty());
        assert!(f.fetch_batch(1, &quick()).await.is_empty());
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn test_page_strategies() {
        let oracle = Arc::new(ScriptedOracle::new(HashMap::new()));
        let f = fetcher(&oracle, 23);

        let first = FetchOptions {
            pages: PageStrategy::First,
            ..quick()
        };
        f.fetch_batch(5, &first).await;
        assert!(oracle.calls().iter().all(|(_, page)| *page == 1));

        let random = FetchOptions {
            pages: PageStrategy::Random,
            ..quick()
        };
        f.fetch_batch(5, &random).await;
        let pages: Vec<u32> = oracle.calls()[SEARCH_TERMS.len()..]
            .iter()
            .map(|(_, p)| *p)
            .collect();
        assert!(pages.iter().all(|p| (1..=MAX_RANDOM_PAGE).contains(p)));
    }

    #[tokio::test]
    async fn test_max_terms_limits_queries() {
        let oracle = Arc::new(ScriptedOracle::new(HashMap::new()));
        let options = FetchOptions {
            max_terms: 5,
            ..quick()
        };
        fetcher(&oracle, 29).fetch_batch(20, &options).await;
        assert_eq!(oracle.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_pause_between_terms() {
        let oracle = Arc::new(ScriptedOracle::new(HashMap::new()));
        let pause = Duration::from_millis(20);
        let options = FetchOptions {
            pause,
            max_terms: 4,
            ..FetchOptions::default()
        };
        let started = std::time::Instant::now();
        fetcher(&oracle, 37).fetch_batch(20, &options).await;
        assert_eq!(oracle.calls().len(), 4);
        assert!(started.elapsed() >= pause * 3, "took {:?}", started.elapsed());
    }

    #[tokio::test]
    async fn test_same_seed_same_term_order() {
        let a = Arc::new(ScriptedOracle::new(HashMap::new()));
        let b = Arc::new(ScriptedOracle::new(HashMap::new()));
        fetcher(&a, 31).fetch_batch(20, &quick()).await;
        fetcher(&b, 31).fetch_batch(20, &quick()).await;
        assert_eq!(a.calls(), b.calls());
    }

    #[test]
    fn test_page_strategy_serde() {
        let p: PageStrategy = serde_json::from_str("\"random\"").unwrap();
        assert_eq!(p, PageStrategy::Random);
        assert_eq!(serde_json::to_string(&PageStrategy::First).unwrap(), "\"first\"");
    }
}
