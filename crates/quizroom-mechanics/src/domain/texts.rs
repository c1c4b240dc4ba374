//! Participant-facing and display-facing strings.

pub const TITLE_REGISTRATION: &str = "Registration";
pub const TITLE_OPEN: &str = "Open question";
pub const TITLE_QUIZ: &str = "Pick the right answer";
pub const TITLE_MULTI: &str = "Pick all correct answers";
pub const TITLE_SEQUENCE: &str = "Put in order";
pub const TITLE_LEADERBOARD: &str = "Results";

pub const STAGE_VOTING_SUFFIX: &str = "voting";
pub const STAGE_RESULTS_SUFFIX: &str = "results";

pub const INSTR_OPEN_DISPLAY: &str = "Send your ideas to the bot. They stay hidden here for now.";
pub const INSTR_CHOICE_DISPLAY: &str = "Participants choose an option in the bot.";
pub const INSTR_VOTE_DISPLAY: &str = "Vote for the best ideas in the bot.";

pub const REGISTRATION_WAIT: &str = "You are registered. Wait for the quiz to start.";

pub const OPEN_HEADER: &str = "Open question";
pub const OPEN_INSTR: &str = "Send your idea as a message. You can resend it to replace it.";
pub const IDEA_ACCEPTED: &str = "Idea accepted. Send another message to replace it.";
pub const IDEA_EMPTY: &str = "An empty message is not an idea.";
pub const NOT_COLLECTING_IDEAS: &str = "Ideas are not being collected right now.";
pub const VOTE_START: &str = "Vote for the ideas you like. Tap again to take a vote back.";
pub const VOTE_NO_OPTIONS: &str = "There are no ideas to vote for.";
pub const VOTE_COUNTED: &str = "Vote counted.";
pub const VOTE_REMOVED: &str = "Vote removed.";
pub const VOTE_OWN_IDEA: &str = "You cannot vote for your own idea.";
pub const NOT_VOTE_PHASE: &str = "Voting is not open right now.";

pub const QUIZ_HEADER: &str = "Question";
pub const QUIZ_INSTR: &str = "Choose one answer. You can change it until time runs out.";
pub const MULTI_HEADER: &str = "Question with several answers";
pub const MULTI_INSTR: &str = "Tap every correct answer. Tap again to deselect.";
pub const SEQUENCE_HEADER: &str = "Put in order";
pub const SEQUENCE_INSTR: &str = "Tap the items in the correct order.";
pub const SEQUENCE_RESET: &str = "Start over";

pub const ANSWER_SAVED: &str = "Answer saved.";
pub const ANSWER_UNCHANGED: &str = "Answer unchanged.";
pub const NOT_ANSWER_PHASE: &str = "Answers are closed.";
pub const UNKNOWN_OPTION: &str = "Unknown option.";
pub const TEXT_NOT_EXPECTED: &str = "No text answer is expected right now.";
pub const SELECTION_NOT_EXPECTED: &str = "This button is no longer active.";

pub const NO_ANSWER: &str = "You did not answer.";
pub const WRONG_ANSWER: &str = "Wrong answer.";
pub const WRONG_SEQUENCE: &str = "The order is wrong.";
pub const RESPONSES_CLOSED: &str = " Answers are closed.";

/// Reply for a scored answer.
#[must_use]
pub fn correct(points: i64) -> String {
    format!("Correct! +{points} points.")
}

/// Reply after voting ends.
#[must_use]
pub fn vote_finished(points: usize) -> String {
    format!("Voting finished. Your idea collected {points} votes.")
}

/// Greeting for a (re)registered participant.
#[must_use]
pub fn registered(name: &str) -> String {
    format!("Welcome, {name}! {REGISTRATION_WAIT}")
}

/// Personal end-of-event statistics.
#[must_use]
pub fn leaderboard(place: usize, score: i64, open_avg: f64, quiz_avg: f64) -> String {
    format!(
        "The quiz is over!\nPlace: {place}\nScore: {score}\n\
         Average open answer time: {open_avg:.1} s\nAverage quiz answer time: {quiz_avg:.1} s"
    )
}
