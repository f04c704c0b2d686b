use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub ordinal: usize,
    pub name: String,
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub ordinal: usize,
    pub name: String,
    pub source_url: String,
}

impl Course {
    /// Lesson/video pairs in document order.
    pub fn videos(&self) -> impl Iterator<Item = (&Lesson, &Video)> + '_ {
        self.lessons
            .iter()
            .flat_map(|lesson| lesson.videos.iter().map(move |video| (lesson, video)))
    }

    pub fn video_count(&self) -> usize {
        self.lessons.iter().map(|l| l.videos.len()).sum()
    }
}
