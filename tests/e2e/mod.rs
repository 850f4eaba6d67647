// End-to-end tests for the narration backend API
//
// Each test gets its own server bound to an ephemeral port, an in-memory
// credential store seeded with test keys, and httpmock servers standing in
// for Gemini and ElevenLabs. Nothing is shared between tests, so they run in
// parallel.

mod helpers;
mod test_catalog;
mod test_credentials;
mod test_health;
mod test_tts;
