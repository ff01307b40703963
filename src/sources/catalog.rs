// src/sources/catalog.rs
//! The default adapter set. Ordering matters: the first occurrence of a url
//! wins deduplication, so the more reliable transports come first.

use crate::config::AppConfig;
use crate::sources::api::{NationalBoardAdapter, RemoteApiAdapter};
use crate::sources::board_search::BoardSearchAdapter;
use crate::sources::feed::FeedAdapter;
use crate::sources::markup::{MarkupAdapter, SelectorSpec};
use crate::sources::types::{Flag, SourceAdapter};

pub fn default_adapters(
    cfg: &AppConfig,
    client: &reqwest::Client,
) -> Vec<Box<dyn SourceAdapter>> {
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::new();

    // --- Tier 1: feeds ---
    adapters.push(Box::new(
        FeedAdapter::from_urls(
            "Remotive",
            vec!["https://remotive.com/remote-jobs?feed=rss".into()],
            client.clone(),
        )
        .with_caps(cfg.result_cap_for("Remotive", 20), 20)
        .with_flags(&[Flag::PreVerifiedRemote]),
    ));
    adapters.push(Box::new(
        FeedAdapter::from_urls(
            "We Work Remotely",
            vec![
                "https://weworkremotely.com/categories/remote-programming-jobs.rss".into(),
                "https://weworkremotely.com/categories/remote-devops-sysadmin-jobs.rss".into(),
                "https://weworkremotely.com/categories/remote-product-jobs.rss".into(),
            ],
            client.clone(),
        )
        .with_caps(cfg.result_cap_for("We Work Remotely", 30), 10)
        .with_flags(&[Flag::PreVerifiedRemote]),
    ));
    adapters.push(Box::new(
        FeedAdapter::from_urls(
            "EU Remote Jobs",
            vec!["https://euremotejobs.com/jobs.xml".into()],
            client.clone(),
        )
        .with_caps(cfg.result_cap_for("EU Remote Jobs", 20), 20)
        .with_location("Remote (EU)")
        .with_flags(&[Flag::PreVerifiedRemote]),
    ));
    adapters.push(Box::new(
        FeedAdapter::from_urls(
            "Working Nomads",
            vec!["https://www.workingnomads.com/jobs/feed".into()],
            client.clone(),
        )
        .with_caps(cfg.result_cap_for("Working Nomads", 15), 15)
        .with_flags(&[Flag::PreVerifiedRemote]),
    ));
    adapters.push(Box::new(
        FeedAdapter::from_urls(
            "Remote Rocketship",
            vec!["https://remoterocketship.com/jobs/feed".into()],
            client.clone(),
        )
        .with_caps(cfg.result_cap_for("Remote Rocketship", 15), 15)
        .with_flags(&[Flag::PreVerifiedRemote]),
    ));

    // --- Tier 1: JSON APIs ---
    adapters.push(Box::new(
        RemoteApiAdapter::from_url(
            "Jobicy",
            format!(
                "https://jobicy.com/api/v2/remote-jobs?count={}",
                cfg.result_cap_for("Jobicy", 20)
            ),
            client.clone(),
        )
        .with_cap(cfg.result_cap_for("Jobicy", 20))
        .with_flags(&[Flag::PreVerifiedRemote]),
    ));
    adapters.push(Box::new(
        NationalBoardAdapter::from_url(
            "Platsbanken",
            format!(
                "https://jobsearch.api.jobtechdev.se/search?q={}&limit={}",
                "junior%20OR%20trainee%20OR%20graduate",
                cfg.result_cap_for("Platsbanken", 20)
            ),
            client.clone(),
        )
        .with_cap(cfg.result_cap_for("Platsbanken", 20))
        .with_flags(&[Flag::LocalMarket]),
    ));

    // --- Tier 2: scraped markup ---
    adapters.push(Box::new(
        MarkupAdapter::from_url(
            "Remote OK",
            "https://remoteok.com/remote-dev-jobs".into(),
            "https://remoteok.com",
            SelectorSpec {
                listing: "tr.job",
                title: "h2[itemprop='title']",
                company: Some("h3[itemprop='name']"),
                link: "a.preventLink",
            },
            client.clone(),
        )
        .with_cap(cfg.result_cap_for("Remote OK", 20))
        .with_flags(&[Flag::PreVerifiedRemote]),
    ));
    adapters.push(Box::new(
        MarkupAdapter::from_url(
            "Himalayas",
            "https://himalayas.app/jobs/remote".into(),
            "https://himalayas.app",
            SelectorSpec {
                listing: "div.job-card",
                title: "h3",
                company: Some("div.company-name"),
                link: "a",
            },
            client.clone(),
        )
        .with_cap(cfg.result_cap_for("Himalayas", 20))
        .with_flags(&[Flag::PreVerifiedRemote]),
    ));
    adapters.push(Box::new(
        MarkupAdapter::from_url(
            "JustRemote",
            "https://justremote.co/remote-developer-jobs".into(),
            "https://justremote.co",
            SelectorSpec {
                listing: "div.job-listing",
                title: "h3",
                company: Some("span.company"),
                link: "a",
            },
            client.clone(),
        )
        .with_cap(cfg.result_cap_for("JustRemote", 15))
        .with_flags(&[Flag::PreVerifiedRemote]),
    ));
    adapters.push(Box::new(
        MarkupAdapter::from_url(
            "Jobbsafari",
            "https://www.jobbsafari.se/jobb/junior".into(),
            "https://www.jobbsafari.se",
            SelectorSpec {
                listing: "div.job-item",
                title: "h2",
                company: Some("span.company"),
                link: "a",
            },
            client.clone(),
        )
        .with_cap(cfg.result_cap_for("Jobbsafari", 15))
        .with_location("Sverige")
        .with_flags(&[Flag::LocalMarket]),
    ));
    adapters.push(Box::new(
        MarkupAdapter::from_url(
            "Ledigajobb",
            "https://www.ledigajobb.se/junior".into(),
            "https://www.ledigajobb.se",
            SelectorSpec {
                listing: "div.job",
                title: "h3",
                company: Some("span.company-name"),
                link: "a",
            },
            client.clone(),
        )
        .with_cap(cfg.result_cap_for("Ledigajobb", 15))
        .with_location("Sverige")
        .with_flags(&[Flag::LocalMarket]),
    ));
    adapters.push(Box::new(
        MarkupAdapter::from_url(
            "Blocket Jobb",
            "https://jobb.blocket.se/lediga-jobb-junior".into(),
            "https://jobb.blocket.se",
            SelectorSpec {
                listing: "article",
                title: "h2",
                company: Some("span.company"),
                link: "a",
            },
            client.clone(),
        )
        .with_cap(cfg.result_cap_for("Blocket Jobb", 15))
        .with_location("Sverige")
        .with_flags(&[Flag::LocalMarket]),
    ));

    // --- Tier 3: multi-board search service, when an endpoint is configured ---
    if let Some(endpoint) = &cfg.board_search_url {
        adapters.push(Box::new(
            BoardSearchAdapter::from_endpoint(
                endpoint.clone(),
                cfg.search_terms.clone(),
                client.clone(),
            )
            .with_caps(cfg.result_cap_for("Board Search", 100), 20),
        ));
    }

    adapters
}
