use time::Duration;
use time::OffsetDateTime;

/// Facilitator row before an id is assigned.
pub struct Profile {
    pub name: &'static str,
    pub email: &'static str,
    pub specialization: &'static str,
    pub bio: &'static str,
}

/// Event row before an id is assigned. `host` indexes [`PROFILES`].
pub struct Offering {
    pub title: &'static str,
    pub description: &'static str,
    pub days_ahead: i64,
    pub duration: i32,
    pub location: &'static str,
    pub price: f64,
    pub capacity: i32,
    pub host: usize,
    pub kind: &'static str,
}

impl Offering {
    pub fn date(&self, now: OffsetDateTime) -> OffsetDateTime {
        now + Duration::days(self.days_ahead)
    }
}

/// Sample data written on first start, when no facilitator exists yet.
#[rustfmt::skip]
pub const PROFILES: [Profile; 3] = [
    Profile {
        name:           "Dr. Sarah Johnson",
        email:          "sarah@example.com",
        specialization: "Mindfulness & Meditation",
        bio:            "Expert in mindfulness practices with 15+ years experience",
    },
    Profile {
        name:           "Michael Chen",
        email:          "michael@example.com",
        specialization: "Yoga & Wellness",
        bio:            "Certified yoga instructor and wellness coach",
    },
    Profile {
        name:           "Emma Rodriguez",
        email:          "emma@example.com",
        specialization: "Life Coaching",
        bio:            "Professional life coach specializing in personal development",
    },
];

#[rustfmt::skip]
pub const OFFERINGS: [Offering; 3] = [
    Offering {
        title:       "Morning Meditation Session",
        description: "Start your day with a peaceful meditation session focusing on breath awareness and mindfulness techniques.",
        days_ahead:  3,
        duration:    60,
        location:    "Zen Studio, Downtown",
        price:       25.00,
        capacity:    15,
        host:        0,
        kind:        "session",
    },
    Offering {
        title:       "Weekend Yoga Retreat",
        description: "A rejuvenating weekend retreat combining yoga, meditation, and nature walks in a serene mountain setting.",
        days_ahead:  10,
        duration:    2880,
        location:    "Mountain View Retreat Center",
        price:       299.00,
        capacity:    20,
        host:        1,
        kind:        "retreat",
    },
    Offering {
        title:       "Life Coaching Workshop",
        description: "Interactive workshop on goal setting, overcoming obstacles, and creating positive life changes.",
        days_ahead:  7,
        duration:    180,
        location:    "Community Center, Room 201",
        price:       75.00,
        capacity:    12,
        host:        2,
        kind:        "session",
    },
];
