pub mod conversation_states;
