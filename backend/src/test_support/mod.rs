//! In-memory port implementations for integration-style tests.
//!
//! [`InMemoryBackend`] implements every repository port against shared
//! state behind one mutex, mirroring the database semantics the Diesel
//! adapters rely on: (follower, followee) and (owner, album) uniqueness,
//! upserts that keep ids and creation timestamps, anonymization that
//! clears ownership without touching content, and newest-first orderings
//! with id tie-breaks.
//!
//! Timestamps come from a logical clock that advances by one microsecond
//! per write, so ordering assertions are deterministic.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    AccountPurgeError, AccountPurgeRepository, ActivityRepository, ActivityRepositoryError,
    NewUserRecord, RatingRepository, RatingRepositoryError, ReviewRepository,
    ReviewRepositoryError, SocialGraphRepository, SocialGraphRepositoryError, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    ActivityEvent, ActivityKind, AlbumId, Attribution, CredentialHash, DeletionAudit,
    EmailAddress, FollowEdge, NewActivity, Rating, RatingValue, Review, ReviewBody, User, UserId,
    UserProfile, Username,
};

#[derive(Debug, Clone)]
struct UserRecord {
    id: UserId,
    username: Username,
    email: EmailAddress,
    credential_hash: CredentialHash,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct RatingRecord {
    id: Uuid,
    owner: Option<UserId>,
    album_id: AlbumId,
    value: RatingValue,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ReviewRecord {
    id: Uuid,
    owner: Option<UserId>,
    album_id: AlbumId,
    body: ReviewBody,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct ActivityRecord {
    id: Uuid,
    actor: Option<UserId>,
    kind: ActivityKind,
    album_id: AlbumId,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<UserRecord>,
    edges: Vec<FollowEdge>,
    ratings: Vec<RatingRecord>,
    reviews: Vec<ReviewRecord>,
    activities: Vec<ActivityRecord>,
    audits: Vec<DeletionAudit>,
    tick: i64,
}

impl MemoryState {
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        Utc.timestamp_opt(1_700_000_000, 0)
            .single()
            .map(|base| base + chrono::Duration::microseconds(self.tick))
            .unwrap_or_else(Utc::now)
    }

    fn profile_of(&self, user: &UserId) -> Option<UserProfile> {
        self.users
            .iter()
            .find(|record| record.id == *user)
            .map(|record| UserProfile {
                id: record.id,
                username: record.username.clone(),
            })
    }
}

/// Shared in-memory backend implementing every repository port.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Register a user with generated contact details; test convenience.
    ///
    /// # Panics
    ///
    /// Panics when `username` fails validation.
    pub fn register_user(&self, username: &str) -> UserId {
        let id = UserId::random();
        let username = Username::new(username).expect("valid test username");
        let email = EmailAddress::new(format!("{username}@example.com"))
            .expect("valid generated email");
        self.with_state(|state| {
            let now = state.next_timestamp();
            state.users.push(UserRecord {
                id,
                username,
                email,
                credential_hash: CredentialHash::new("test-hash"),
                created_at: now,
                updated_at: now,
            });
        });
        id
    }

    /// Audit records committed by purges, oldest-first.
    pub fn audits(&self) -> Vec<DeletionAudit> {
        self.with_state(|state| state.audits.clone())
    }
}

fn event_from(record: &ActivityRecord) -> ActivityEvent {
    ActivityEvent {
        id: record.id,
        actor: Attribution::from(record.actor),
        kind: record.kind,
        album_id: record.album_id.clone(),
        payload: record.payload.clone(),
        created_at: record.created_at,
    }
}

fn rating_from(record: &RatingRecord) -> Rating {
    Rating {
        id: record.id,
        owner: Attribution::from(record.owner),
        album_id: record.album_id.clone(),
        value: record.value,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

fn review_from(record: &ReviewRecord) -> Review {
    Review {
        id: record.id,
        owner: Attribution::from(record.owner),
        album_id: record.album_id.clone(),
        body: record.body.clone(),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, Uuid)) {
    items.sort_by(|a, b| {
        let (time_a, id_a) = key(a);
        let (time_b, id_b) = key(b);
        time_b.cmp(&time_a).then(id_a.cmp(&id_b))
    });
}

fn paginate<T>(items: Vec<T>, limit: u32, offset: u64) -> Vec<T> {
    items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl UserRepository for InMemoryBackend {
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserRepositoryError> {
        self.with_state(|state| {
            let taken = state.users.iter().any(|existing| {
                existing.username == record.username || existing.email == record.email
            });
            if taken {
                return Err(UserRepositoryError::duplicate_user(
                    "username or email already taken",
                ));
            }
            let now = state.next_timestamp();
            state.users.push(UserRecord {
                id: record.id,
                username: record.username.clone(),
                email: record.email.clone(),
                credential_hash: record.credential_hash.clone(),
                created_at: now,
                updated_at: now,
            });
            Ok(User::new(
                record.id,
                record.username.clone(),
                record.email.clone(),
                record.credential_hash.clone(),
                now,
                now,
            ))
        })
    }

    async fn find_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<UserProfile>, UserRepositoryError> {
        Ok(self.with_state(|state| state.profile_of(user)))
    }

    async fn exists(&self, user: &UserId) -> Result<bool, UserRepositoryError> {
        Ok(self.with_state(|state| state.users.iter().any(|record| record.id == *user)))
    }
}

#[async_trait]
impl SocialGraphRepository for InMemoryBackend {
    async fn insert_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<FollowEdge, SocialGraphRepositoryError> {
        self.with_state(|state| {
            let duplicate = state
                .edges
                .iter()
                .any(|edge| edge.follower == *follower && edge.followee == *followee);
            if duplicate {
                return Err(SocialGraphRepositoryError::duplicate_edge());
            }
            let edge = FollowEdge {
                id: Uuid::new_v4(),
                follower: *follower,
                followee: *followee,
                created_at: state.next_timestamp(),
            };
            state.edges.push(edge.clone());
            Ok(edge)
        })
    }

    async fn delete_edge(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, SocialGraphRepositoryError> {
        Ok(self.with_state(|state| {
            let before = state.edges.len();
            state
                .edges
                .retain(|edge| !(edge.follower == *follower && edge.followee == *followee));
            state.edges.len() < before
        }))
    }

    async fn edge_exists(
        &self,
        follower: &UserId,
        followee: &UserId,
    ) -> Result<bool, SocialGraphRepositoryError> {
        Ok(self.with_state(|state| {
            state
                .edges
                .iter()
                .any(|edge| edge.follower == *follower && edge.followee == *followee)
        }))
    }

    async fn followers(
        &self,
        user: &UserId,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError> {
        Ok(self.with_state(|state| {
            let mut edges: Vec<FollowEdge> = state
                .edges
                .iter()
                .filter(|edge| edge.followee == *user)
                .cloned()
                .collect();
            newest_first(&mut edges, |edge| (edge.created_at, edge.id));
            edges
                .iter()
                .filter_map(|edge| state.profile_of(&edge.follower))
                .collect()
        }))
    }

    async fn following(
        &self,
        user: &UserId,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError> {
        Ok(self.with_state(|state| {
            let mut edges: Vec<FollowEdge> = state
                .edges
                .iter()
                .filter(|edge| edge.follower == *user)
                .cloned()
                .collect();
            newest_first(&mut edges, |edge| (edge.created_at, edge.id));
            edges
                .iter()
                .filter_map(|edge| state.profile_of(&edge.followee))
                .collect()
        }))
    }

    async fn follower_count(&self, user: &UserId) -> Result<u64, SocialGraphRepositoryError> {
        Ok(self.with_state(|state| {
            state.edges.iter().filter(|edge| edge.followee == *user).count() as u64
        }))
    }

    async fn following_count(&self, user: &UserId) -> Result<u64, SocialGraphRepositoryError> {
        Ok(self.with_state(|state| {
            state.edges.iter().filter(|edge| edge.follower == *user).count() as u64
        }))
    }

    async fn mutual_follows(
        &self,
        user: &UserId,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError> {
        let following = self.following(user).await?;
        Ok(self.with_state(|state| {
            following
                .into_iter()
                .filter(|profile| {
                    state
                        .edges
                        .iter()
                        .any(|edge| edge.follower == profile.id && edge.followee == *user)
                })
                .collect()
        }))
    }

    async fn follow_suggestions(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<UserProfile>, SocialGraphRepositoryError> {
        Ok(self.with_state(|state| {
            let followees: Vec<UserId> = state
                .edges
                .iter()
                .filter(|edge| edge.follower == *user)
                .map(|edge| edge.followee)
                .collect();
            let mut suggestions = Vec::new();
            for followee in &followees {
                for edge in state.edges.iter().filter(|edge| edge.follower == *followee) {
                    let candidate = edge.followee;
                    if candidate == *user
                        || followees.contains(&candidate)
                        || suggestions.contains(&candidate)
                    {
                        continue;
                    }
                    suggestions.push(candidate);
                }
            }
            suggestions
                .into_iter()
                .take(limit as usize)
                .filter_map(|id| state.profile_of(&id))
                .collect()
        }))
    }
}

#[async_trait]
impl RatingRepository for InMemoryBackend {
    async fn upsert(
        &self,
        owner: &UserId,
        album: &AlbumId,
        value: RatingValue,
    ) -> Result<Rating, RatingRepositoryError> {
        self.with_state(|state| {
            let now = state.next_timestamp();
            if let Some(record) = state
                .ratings
                .iter_mut()
                .find(|record| record.owner == Some(*owner) && record.album_id == *album)
            {
                record.value = value;
                record.updated_at = now;
                return Ok(rating_from(record));
            }
            let record = RatingRecord {
                id: Uuid::new_v4(),
                owner: Some(*owner),
                album_id: album.clone(),
                value,
                created_at: now,
                updated_at: now,
            };
            let rating = rating_from(&record);
            state.ratings.push(record);
            Ok(rating)
        })
    }

    async fn find_by_owner_and_album(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<Option<Rating>, RatingRepositoryError> {
        Ok(self.with_state(|state| {
            state
                .ratings
                .iter()
                .find(|record| record.owner == Some(*owner) && record.album_id == *album)
                .map(rating_from)
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Rating>, RatingRepositoryError> {
        Ok(self.with_state(|state| {
            state
                .ratings
                .iter()
                .find(|record| record.id == id)
                .map(rating_from)
        }))
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Rating>, RatingRepositoryError> {
        Ok(self.with_state(|state| {
            let mut records: Vec<RatingRecord> = state
                .ratings
                .iter()
                .filter(|record| record.owner == Some(*owner))
                .cloned()
                .collect();
            newest_first(&mut records, |record| (record.created_at, record.id));
            records.iter().map(rating_from).collect()
        }))
    }

    async fn list_by_album(&self, album: &AlbumId) -> Result<Vec<Rating>, RatingRepositoryError> {
        Ok(self.with_state(|state| {
            let mut records: Vec<RatingRecord> = state
                .ratings
                .iter()
                .filter(|record| record.album_id == *album)
                .cloned()
                .collect();
            records.sort_by(|a, b| {
                a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
            });
            records.iter().map(rating_from).collect()
        }))
    }

    async fn average_for_album(
        &self,
        album: &AlbumId,
    ) -> Result<Option<f64>, RatingRepositoryError> {
        Ok(self.with_state(|state| {
            let values: Vec<f64> = state
                .ratings
                .iter()
                .filter(|record| record.album_id == *album)
                .map(|record| f64::from(record.value.get()))
                .collect();
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        }))
    }

    async fn count_for_album(&self, album: &AlbumId) -> Result<u64, RatingRepositoryError> {
        Ok(self.with_state(|state| {
            state
                .ratings
                .iter()
                .filter(|record| record.album_id == *album)
                .count() as u64
        }))
    }

    async fn delete(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<bool, RatingRepositoryError> {
        Ok(self.with_state(|state| {
            let before = state.ratings.len();
            state
                .ratings
                .retain(|record| !(record.owner == Some(*owner) && record.album_id == *album));
            state.ratings.len() < before
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RatingRepositoryError> {
        Ok(self.with_state(|state| {
            let before = state.ratings.len();
            state.ratings.retain(|record| record.id != id);
            state.ratings.len() < before
        }))
    }
}

#[async_trait]
impl ReviewRepository for InMemoryBackend {
    async fn upsert(
        &self,
        owner: &UserId,
        album: &AlbumId,
        body: &ReviewBody,
    ) -> Result<Review, ReviewRepositoryError> {
        self.with_state(|state| {
            let now = state.next_timestamp();
            if let Some(record) = state
                .reviews
                .iter_mut()
                .find(|record| record.owner == Some(*owner) && record.album_id == *album)
            {
                record.body = body.clone();
                record.updated_at = now;
                return Ok(review_from(record));
            }
            let record = ReviewRecord {
                id: Uuid::new_v4(),
                owner: Some(*owner),
                album_id: album.clone(),
                body: body.clone(),
                created_at: now,
                updated_at: now,
            };
            let review = review_from(&record);
            state.reviews.push(record);
            Ok(review)
        })
    }

    async fn find_by_owner_and_album(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        Ok(self.with_state(|state| {
            state
                .reviews
                .iter()
                .find(|record| record.owner == Some(*owner) && record.album_id == *album)
                .map(review_from)
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Review>, ReviewRepositoryError> {
        Ok(self.with_state(|state| {
            state
                .reviews
                .iter()
                .find(|record| record.id == id)
                .map(review_from)
        }))
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Review>, ReviewRepositoryError> {
        Ok(self.with_state(|state| {
            let mut records: Vec<ReviewRecord> = state
                .reviews
                .iter()
                .filter(|record| record.owner == Some(*owner))
                .cloned()
                .collect();
            newest_first(&mut records, |record| (record.created_at, record.id));
            records.iter().map(review_from).collect()
        }))
    }

    async fn list_by_album(&self, album: &AlbumId) -> Result<Vec<Review>, ReviewRepositoryError> {
        Ok(self.with_state(|state| {
            let mut records: Vec<ReviewRecord> = state
                .reviews
                .iter()
                .filter(|record| record.album_id == *album)
                .cloned()
                .collect();
            records.sort_by(|a, b| {
                a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
            });
            records.iter().map(review_from).collect()
        }))
    }

    async fn count_for_album(&self, album: &AlbumId) -> Result<u64, ReviewRepositoryError> {
        Ok(self.with_state(|state| {
            state
                .reviews
                .iter()
                .filter(|record| record.album_id == *album)
                .count() as u64
        }))
    }

    async fn delete(
        &self,
        owner: &UserId,
        album: &AlbumId,
    ) -> Result<bool, ReviewRepositoryError> {
        Ok(self.with_state(|state| {
            let before = state.reviews.len();
            state
                .reviews
                .retain(|record| !(record.owner == Some(*owner) && record.album_id == *album));
            state.reviews.len() < before
        }))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ReviewRepositoryError> {
        Ok(self.with_state(|state| {
            let before = state.reviews.len();
            state.reviews.retain(|record| record.id != id);
            state.reviews.len() < before
        }))
    }
}

#[async_trait]
impl ActivityRepository for InMemoryBackend {
    async fn record(
        &self,
        activity: &NewActivity,
    ) -> Result<ActivityEvent, ActivityRepositoryError> {
        self.with_state(|state| {
            let now = state.next_timestamp();
            if let Some(record) = state.activities.iter_mut().find(|record| {
                record.actor == Some(activity.actor)
                    && record.kind == activity.kind
                    && record.album_id == activity.album_id
            }) {
                record.payload = activity.payload.clone();
                record.created_at = now;
                return Ok(event_from(record));
            }
            let record = ActivityRecord {
                id: Uuid::new_v4(),
                actor: Some(activity.actor),
                kind: activity.kind,
                album_id: activity.album_id.clone(),
                payload: activity.payload.clone(),
                created_at: now,
            };
            let event = event_from(&record);
            state.activities.push(record);
            Ok(event)
        })
    }

    async fn list_by_actors(
        &self,
        actors: &[UserId],
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError> {
        Ok(self.with_state(|state| {
            let mut records: Vec<ActivityRecord> = state
                .activities
                .iter()
                .filter(|record| {
                    record
                        .actor
                        .is_some_and(|actor| actors.contains(&actor))
                })
                .cloned()
                .collect();
            newest_first(&mut records, |record| (record.created_at, record.id));
            paginate(records.iter().map(event_from).collect(), limit, offset)
        }))
    }

    async fn count_by_actors(
        &self,
        actors: &[UserId],
    ) -> Result<u64, ActivityRepositoryError> {
        Ok(self.with_state(|state| {
            state
                .activities
                .iter()
                .filter(|record| {
                    record
                        .actor
                        .is_some_and(|actor| actors.contains(&actor))
                })
                .count() as u64
        }))
    }

    async fn list_by_actor(
        &self,
        actor: &UserId,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError> {
        self.list_by_actors(std::slice::from_ref(actor), limit, offset)
            .await
    }

    async fn count_by_actor(&self, actor: &UserId) -> Result<u64, ActivityRepositoryError> {
        self.count_by_actors(std::slice::from_ref(actor)).await
    }

    async fn list_recent(
        &self,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError> {
        Ok(self.with_state(|state| {
            let mut records = state.activities.clone();
            newest_first(&mut records, |record| (record.created_at, record.id));
            paginate(records.iter().map(event_from).collect(), limit, offset)
        }))
    }

    async fn list_by_kind(
        &self,
        kind: ActivityKind,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<ActivityEvent>, ActivityRepositoryError> {
        Ok(self.with_state(|state| {
            let mut records: Vec<ActivityRecord> = state
                .activities
                .iter()
                .filter(|record| record.kind == kind)
                .cloned()
                .collect();
            newest_first(&mut records, |record| (record.created_at, record.id));
            paginate(records.iter().map(event_from).collect(), limit, offset)
        }))
    }
}

#[async_trait]
impl AccountPurgeRepository for InMemoryBackend {
    async fn purge(&self, user: &UserId) -> Result<DeletionAudit, AccountPurgeError> {
        self.with_state(|state| {
            if !state.users.iter().any(|record| record.id == *user) {
                return Err(AccountPurgeError::user_missing());
            }

            let ratings_count = state
                .ratings
                .iter()
                .filter(|record| record.owner == Some(*user))
                .count() as u64;
            let reviews_count = state
                .reviews
                .iter()
                .filter(|record| record.owner == Some(*user))
                .count() as u64;
            let follows_count = state
                .edges
                .iter()
                .filter(|edge| edge.follower == *user || edge.followee == *user)
                .count() as u64;

            for record in &mut state.ratings {
                if record.owner == Some(*user) {
                    record.owner = None;
                }
            }
            for record in &mut state.reviews {
                if record.owner == Some(*user) {
                    record.owner = None;
                }
            }
            for record in &mut state.activities {
                if record.actor == Some(*user) {
                    record.actor = None;
                }
            }
            state
                .edges
                .retain(|edge| edge.follower != *user && edge.followee != *user);
            state.users.retain(|record| record.id != *user);

            let audit = DeletionAudit {
                id: Uuid::new_v4(),
                user_id: *user,
                deleted_at: state.next_timestamp(),
                ratings_count,
                reviews_count,
                follows_count,
            };
            state.audits.push(audit.clone());
            Ok(audit)
        })
    }
}
