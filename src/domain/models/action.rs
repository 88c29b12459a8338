use super::ProfileName;

pub enum Action {
    ClearTranscript(),
    Retry(),
    SelectProfile(ProfileName),
    SendMessage(String),
    ToggleProfile(),
}
