// `EventRouter` handler implementations, one file per concern
mod chat_events;
mod connection_events;
mod membership_events;
