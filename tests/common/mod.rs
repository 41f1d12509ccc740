#![allow(dead_code)]

use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

use wellness_hub::HubError;
use wellness_hub::config::Config;
use wellness_hub::service::{CatalogSource, Collection, CollectionKind};
use wellness_hub::types::{Post, PostBoard, Practitioner, Therapy};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn practitioner(id: i64, name: &str, specialties: &[&str]) -> Practitioner {
    Practitioner {
        id,
        useruid: format!("user-{id}"),
        email: Some(format!("p{id}@example.com")),
        name: name.to_string(),
        title: "Terapeuta".to_string(),
        bio: String::new(),
        image: None,
        rating: None,
        reviews: 0,
        price: None,
        languages: vec!["Português".to_string()],
        certifications: Vec::new(),
        availability: Vec::new(),
        specialties: specialties.iter().map(|s| s.to_string()).collect(),
        verified: false,
        featured: false,
        lat: None,
        lng: None,
        location: Some("São Paulo".to_string()),
        created_at: Some(base_time() + Duration::days(id)),
    }
}

pub fn post(id: i64, category: &str, replies: u32) -> Post {
    Post {
        id,
        user_id: format!("user-{id}"),
        username: format!("user{id}"),
        content: format!("post number {id}"),
        category: category.to_string(),
        created_at: base_time() + Duration::minutes(id),
        likes: 0,
        replies,
        image: None,
    }
}

pub fn therapy(id: i64, name: &str) -> Therapy {
    Therapy {
        id,
        name: name.to_string(),
        description: String::new(),
        path: name.to_lowercase(),
    }
}

/// Catalog source returning canned snapshots; failures can be switched on per collection.
#[derive(Default)]
pub struct StubSource {
    pub practitioners: Mutex<Vec<Practitioner>>,
    pub therapies: Mutex<Vec<Therapy>>,
    pub forum: Mutex<Vec<Post>>,
    pub feed: Mutex<Vec<Post>>,
    pub failing: Mutex<HashMap<CollectionKind, String>>,
    pub fetches: Mutex<Vec<CollectionKind>>,
}

impl StubSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_practitioners(&self, items: Vec<Practitioner>) {
        *self.practitioners.lock().unwrap() = items;
    }

    pub fn set_therapies(&self, items: Vec<Therapy>) {
        *self.therapies.lock().unwrap() = items;
    }

    pub fn set_posts(&self, board: PostBoard, items: Vec<Post>) {
        match board {
            PostBoard::Forum => *self.forum.lock().unwrap() = items,
            PostBoard::Feed => *self.feed.lock().unwrap() = items,
        }
    }

    pub fn fail(&self, kind: CollectionKind, message: &str) {
        self.failing.lock().unwrap().insert(kind, message.to_string());
    }

    pub fn recover(&self, kind: CollectionKind) {
        self.failing.lock().unwrap().remove(&kind);
    }

    pub fn fetch_count(&self, kind: CollectionKind) -> usize {
        self.fetches.lock().unwrap().iter().filter(|k| **k == kind).count()
    }
}

#[ractor::async_trait]
impl CatalogSource for StubSource {
    async fn fetch(&self, kind: CollectionKind) -> Result<Collection, HubError> {
        self.fetches.lock().unwrap().push(kind);
        if let Some(message) = self.failing.lock().unwrap().get(&kind) {
            return Err(HubError::NotFound(message.clone()));
        }
        Ok(match kind {
            CollectionKind::Practitioners => {
                Collection::Practitioners(self.practitioners.lock().unwrap().clone())
            }
            CollectionKind::Therapies => {
                Collection::Therapies(self.therapies.lock().unwrap().clone())
            }
            CollectionKind::Forum => {
                Collection::Posts(PostBoard::Forum, self.forum.lock().unwrap().clone())
            }
            CollectionKind::Feed => {
                Collection::Posts(PostBoard::Feed, self.feed.lock().unwrap().clone())
            }
        })
    }
}

/// Serve `app` on an ephemeral local port, standing in for the hosted backend.
pub async fn spawn_fake_store(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake store");
    let addr = listener.local_addr().expect("fake store address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake store crashed");
    });
    Url::parse(&format!("http://{addr}")).expect("fake store url")
}

pub fn config_for(base: &Url) -> Config {
    Config {
        supabase_url: base.clone(),
        supabase_anon_key: "anon-key".to_string(),
        request_timeout_secs: 5,
        ..Config::default()
    }
}
