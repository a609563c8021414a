use super::*;
use std::sync::PoisonError;
use std::sync::RwLock;
use time::OffsetDateTime;

/// A notice as recorded by the CRM.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Notification {
    pub id: usize,
    #[serde(flatten)]
    pub notice: Notice,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
    pub status: &'static str,
}

/// In-memory notification log. Lost on restart.
#[derive(Debug, Default)]
pub struct Inbox {
    notifications: RwLock<Vec<Notification>>,
}

impl Inbox {
    /// Records a notice and returns its notification id (1-based).
    pub fn receive(&self, notice: Notice) -> usize {
        let mut notifications = self
            .notifications
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = notifications.len() + 1;
        log::info!(
            "[crm] booking {} for {} <{}> on {:?} (facilitator {})",
            notice.booking_id,
            notice.user.name,
            notice.user.email,
            notice.event.title,
            notice.facilitator_id
        );
        notifications.push(Notification {
            id,
            notice,
            received_at: OffsetDateTime::now_utc(),
            status: "received",
        });
        id
    }
    /// Newest first, optionally for one facilitator. The count is taken
    /// before the limit applies.
    pub fn recent(&self, facilitator: Option<i64>, limit: usize) -> (Vec<Notification>, usize) {
        let notifications = self
            .notifications
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut matching = notifications
            .iter()
            .filter(|n| facilitator.is_none_or(|f| n.notice.facilitator_id == f))
            .cloned()
            .collect::<Vec<_>>();
        let total = matching.len();
        matching.sort_by(|a, b| b.received_at.cmp(&a.received_at).then(b.id.cmp(&a.id)));
        matching.truncate(limit);
        (matching, total)
    }
    pub fn len(&self) -> usize {
        self.notifications
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(booking_id: i64, facilitator_id: i64) -> Notice {
        Notice {
            booking_id,
            user: Attendee {
                id: 1,
                name: "A".into(),
                email: "a@x.com".into(),
            },
            event: Occasion {
                id: 1,
                title: "Morning Meditation Session".into(),
                date: "2030-01-01T09:00:00Z".into(),
                kind: "session".into(),
            },
            facilitator_id,
        }
    }

    #[test]
    fn ids_are_sequential() {
        let inbox = Inbox::default();
        assert_eq!(inbox.receive(notice(10, 1)), 1);
        assert_eq!(inbox.receive(notice(11, 2)), 2);
        assert_eq!(inbox.len(), 2);
    }

    #[test]
    fn recent_filters_then_limits() {
        let inbox = Inbox::default();
        for (booking, facilitator) in [(1, 1), (2, 2), (3, 1), (4, 1)] {
            inbox.receive(notice(booking, facilitator));
        }
        let (page, total) = inbox.recent(Some(1), 2);
        assert_eq!(total, 3);
        assert_eq!(
            page.iter().map(|n| n.notice.booking_id).collect::<Vec<_>>(),
            vec![4, 3]
        );
        let (all, total) = inbox.recent(None, 50);
        assert_eq!((all.len(), total), (4, 4));
    }
}
