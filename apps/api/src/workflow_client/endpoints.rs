// Webhook paths exposed by the workflow service, relative to WORKFLOW_BASE_URL.
// The multiple-choice session hooks live at the root; the older hooks sit under `webhook/`.

pub const MCQ_SESSION: &str = "interview-mcq-session";
pub const MCQ_FINISH: &str = "interview-mcq-finish";

pub const INTERVIEW_START: &str = "webhook/interview-start";
pub const INTERVIEW_ANSWER: &str = "webhook/interview-answer";
pub const INTERVIEW_FINISH: &str = "webhook/interview-finish";

pub const CV_PROCESS: &str = "webhook/cv-process";
