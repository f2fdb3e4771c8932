//! Post-extraction enrichment: journal rankings for articles and citation
//! metrics reduced over the CV's citation-index entries.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{CitationMetrics, Extracted};
use crate::sections::Article;
use crate::traits::RankingSource;
use crate::tree::Node;

/// Ranking given to articles whose ISSN has no entry in the table.
pub const RANKING_NOT_AVAILABLE: &str = "N/A";
/// Ranking given to every article when the lookup itself fails.
pub const RANKING_LOOKUP_FAILED: &str = "FALHA_DB";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedArticle {
    #[serde(flatten)]
    pub article: Article,
    #[serde(rename = "QUALIS")]
    pub ranking: String,
}

/// ISSN as the ranking table keys it.
pub fn normalize_issn(issn: &str) -> String {
    issn.replace('-', "")
}

/// Annotates every article with its journal ranking, using one batched lookup.
///
/// No lookup is made when no article carries an ISSN. A failed lookup is
/// logged and every article gets [`RANKING_LOOKUP_FAILED`].
pub async fn rank_articles(
    articles: Extracted<Article>,
    rankings: &dyn RankingSource,
) -> Extracted<RankedArticle> {
    let issns: HashSet<String> = articles
        .items()
        .iter()
        .map(|article| normalize_issn(&article.issn))
        .filter(|issn| !issn.is_empty())
        .collect();

    if issns.is_empty() {
        return articles.map(|article| RankedArticle {
            article,
            ranking: RANKING_NOT_AVAILABLE.to_string(),
        });
    }

    match rankings.rankings(&issns).await {
        Ok(table) => {
            debug!(requested = issns.len(), matched = table.len(), "ranking lookup");
            articles.map(|article| {
                let ranking = table
                    .get(&normalize_issn(&article.issn))
                    .cloned()
                    .unwrap_or_else(|| RANKING_NOT_AVAILABLE.to_string());
                RankedArticle { article, ranking }
            })
        }
        Err(e) => {
            warn!(error = %e, "journal ranking lookup failed");
            articles.map(|article| RankedArticle {
                article,
                ranking: RANKING_LOOKUP_FAILED.to_string(),
            })
        }
    }
}

/// Element-wise maximum of total citations and h-index over every
/// `CITACOES` node, or `None` when no node could be read.
///
/// A missing count is 0; a node with an unreadable count is skipped whole.
pub fn citation_metrics(doc: &Node) -> Option<CitationMetrics> {
    let nodes = doc.child("CITACOES")?.nodes();
    let mut metrics: Option<CitationMetrics> = None;

    for node in nodes {
        let Some(element) = node.as_element() else {
            continue;
        };
        if element.attributes.is_empty() {
            continue;
        }
        let (Some(total), Some(h_index)) = (count(node, "TOTAL-CITACOES"), count(node, "INDICE-H"))
        else {
            debug!("skipping citation entry with unreadable counts");
            continue;
        };
        let current = metrics.get_or_insert_with(CitationMetrics::default);
        current.total_citations = current.total_citations.max(total);
        current.h_index = current.h_index.max(h_index);
    }
    metrics
}

/// Attribute as a count: missing is 0, unparsable is `None`, negative clamps to 0.
fn count(node: &Node, key: &str) -> Option<u64> {
    match node.attr(key) {
        None => Some(0),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .map(|value| u64::try_from(value).unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCriteria;
    use crate::sections::articles;
    use crate::testing::MemoryRankings;
    use crate::tree::parse_document;
    use std::sync::atomic::Ordering;

    fn articles_doc(issns: &[&str]) -> Node {
        let items: String = issns
            .iter()
            .enumerate()
            .map(|(i, issn)| {
                format!(
                    r#"<ARTIGO-PUBLICADO SEQUENCIA-PRODUCAO="{i}">
                        <DADOS-BASICOS-DO-ARTIGO TITULO-DO-ARTIGO="Artigo {i}" ANO-DO-ARTIGO="2021"/>
                        <DETALHAMENTO-DO-ARTIGO ISSN="{issn}"/>
                    </ARTIGO-PUBLICADO>"#
                )
            })
            .collect();
        parse_document(&format!(
            "<CV><PRODUCAO-BIBLIOGRAFICA><ARTIGOS-PUBLICADOS>{items}</ARTIGOS-PUBLICADOS></PRODUCAO-BIBLIOGRAFICA></CV>"
        ))
        .unwrap()
    }

    fn rankings_of(ranked: &Extracted<RankedArticle>) -> Vec<&str> {
        ranked.items().iter().map(|r| r.ranking.as_str()).collect()
    }

    #[tokio::test]
    async fn ranked_article_gets_its_class() {
        let doc = articles_doc(&["1234-5678"]);
        let table = MemoryRankings::default().with("12345678", "A1");
        let ranked = rank_articles(articles(&doc, &FilterCriteria::default()), &table).await;

        assert_eq!(rankings_of(&ranked), vec!["A1"]);
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json[0]["QUALIS"], "A1");
        assert_eq!(json[0]["ISSN"], "1234-5678");
        assert_eq!(json[0]["TITULO-DO-ARTIGO"], "Artigo 0");
    }

    #[tokio::test]
    async fn unknown_issn_is_not_available_and_lookup_is_batched() {
        let doc = articles_doc(&["1234-5678", "0000-0001", "1234-5678"]);
        let table = MemoryRankings::default().with("12345678", "B2");
        let ranked = rank_articles(articles(&doc, &FilterCriteria::all()), &table).await;

        assert_eq!(rankings_of(&ranked), vec!["B2", "N/A", "B2"]);
        assert_eq!(table.lookups.load(Ordering::SeqCst), 1);
        let asked = table.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(asked.len(), 2);
        assert!(asked.contains("00000001"));
    }

    #[tokio::test]
    async fn no_issn_means_no_lookup() {
        let doc = articles_doc(&["", ""]);
        let table = MemoryRankings::default();
        let ranked = rank_articles(articles(&doc, &FilterCriteria::all()), &table).await;

        assert_eq!(rankings_of(&ranked), vec!["N/A", "N/A"]);
        assert_eq!(table.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_lookup_marks_every_article() {
        let doc = articles_doc(&["1234-5678", ""]);
        let table = MemoryRankings::failing();
        let ranked = rank_articles(articles(&doc, &FilterCriteria::all()), &table).await;
        assert_eq!(rankings_of(&ranked), vec!["FALHA_DB", "FALHA_DB"]);
    }

    #[tokio::test]
    async fn missing_articles_stay_not_found() {
        let doc = parse_document("<CV><DADOS-GERAIS/></CV>").unwrap();
        let table = MemoryRankings::default();
        let ranked = rank_articles(articles(&doc, &FilterCriteria::default()), &table).await;
        assert!(ranked.is_not_found());
    }

    #[test]
    fn citation_metrics_take_the_maximum_of_each_count() {
        let doc = parse_document(
            r#"<CV>
                <CITACOES TOTAL-CITACOES="10" INDICE-H="3" BASE="ISI"/>
                <CITACOES TOTAL-CITACOES="7" INDICE-H="5" BASE="SCOPUS"/>
            </CV>"#,
        )
        .unwrap();
        assert_eq!(
            citation_metrics(&doc),
            Some(CitationMetrics {
                total_citations: 10,
                h_index: 5
            })
        );
    }

    #[test]
    fn unreadable_citation_nodes_are_skipped() {
        let doc = parse_document(
            r#"<CV>
                <CITACOES TOTAL-CITACOES="muitas" INDICE-H="9"/>
                <CITACOES BASE="SCIELO" INDICE-H="2"/>
            </CV>"#,
        )
        .unwrap();
        assert_eq!(
            citation_metrics(&doc),
            Some(CitationMetrics {
                total_citations: 0,
                h_index: 2
            })
        );

        let only_bad = parse_document(r#"<CV><CITACOES TOTAL-CITACOES="x"/></CV>"#).unwrap();
        assert_eq!(citation_metrics(&only_bad), None);
        let none = parse_document("<CV><DADOS-GERAIS/></CV>").unwrap();
        assert_eq!(citation_metrics(&none), None);
    }

    #[test]
    fn citation_metrics_json_keys() {
        let metrics = CitationMetrics {
            total_citations: 12,
            h_index: 4,
        };
        let json = serde_json::to_value(metrics).unwrap();
        assert_eq!(json["qtdcitpes"], 12);
        assert_eq!(json["clsinh"], 4);
    }
}
