use std::path::Path;

use crate::core::ytdlp;
use crate::models::course::Course;
use crate::models::task::DownloadTask;

pub struct PlanOptions<'a> {
    pub root: &'a Path,
    pub tool: &'a str,
    /// `None` picks `default_format`; `Some("")` downloads without a selector.
    pub format: Option<&'a str>,
    pub default_format: &'a str,
}

/// One task per video, laid out as `root/course/lesson/video.mp4`.
pub fn build_plan(course: &Course, opts: &PlanOptions) -> Vec<DownloadTask> {
    let course_dir = opts.root.join(&course.title);

    course
        .videos()
        .map(|(lesson, video)| {
            let folder = course_dir.join(&lesson.name);
            let output_file = folder.join(format!("{}.mp4", video.name));
            let sidecar_json = folder.join(format!("{}.info.json", video.name));

            DownloadTask {
                resume_command: ytdlp::resume_command(opts.tool, &sidecar_json, &output_file),
                download_command: ytdlp::download_command(
                    opts.tool,
                    &video.source_url,
                    &output_file,
                    opts.format,
                    opts.default_format,
                    None,
                ),
                folder,
                output_file,
                sidecar_json,
            }
        })
        .collect()
}
