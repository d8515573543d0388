//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use chat_relay::EventKind;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    clients: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for all clients in the setup
    pub fn for_all_clients(setup: &'a TestSetup) -> Self {
        let clients = setup.clients.keys().map(|s| s.as_str()).collect();
        Self { setup, clients }
    }

    /// Create an assertion for specific clients
    pub fn for_clients(setup: &'a TestSetup, clients: Vec<&'a str>) -> Self {
        Self { setup, clients }
    }

    /// Assert that each client received exactly one message, of the given
    /// type, and that they all carry the same payload
    pub async fn received_one(self, expected_type: EventKind) -> MessageContent {
        let mut payloads = vec![];

        for client in &self.clients {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(&self.setup.connection(client))
                .await;
            assert_eq!(
                messages.len(),
                1,
                "{} should have received exactly one message, got {:?}",
                client,
                messages
            );
            assert_eq!(
                messages[0].message_type, expected_type,
                "{} received wrong message type",
                client
            );
            payloads.push(messages[0].payload.clone());
        }

        for (i, payload) in payloads.iter().enumerate().skip(1) {
            assert_eq!(
                payload, &payloads[0],
                "Client {} payload differs from client {}",
                self.clients[i], self.clients[0]
            );
        }

        MessageContent {
            payload: payloads.into_iter().next().unwrap_or(Value::Null),
        }
    }

    /// Assert that clients received no messages
    pub async fn received_no_messages(self) {
        for client in &self.clients {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(&self.setup.connection(client))
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                client,
                messages
            );
        }
    }

    /// Assert that clients received a sequence of message types in order
    pub async fn received_sequence(self, expected_types: Vec<EventKind>) -> Vec<MessageContent> {
        let mut result = vec![];

        for client in &self.clients {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(&self.setup.connection(client))
                .await;
            let kinds: Vec<EventKind> = messages.iter().map(|m| m.message_type).collect();
            assert_eq!(kinds, expected_types, "{} received wrong sequence", client);

            if client == &self.clients[0] {
                result = messages
                    .into_iter()
                    .map(|m| MessageContent { payload: m.payload })
                    .collect();
            }
        }

        result
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    pub payload: Value,
}

impl MessageContent {
    /// Assert the roster in an active_users payload, order-independent
    pub fn with_identities(self, expected: Vec<&str>) -> Self {
        let mut actual: Vec<String> =
            serde_json::from_value(self.payload["identities"].clone()).unwrap();
        let mut expected: Vec<String> = expected.into_iter().map(String::from).collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected);
        self
    }

    pub fn with_room(self, expected_room: &str) -> Self {
        assert_eq!(self.payload["roomId"], expected_room);
        self
    }

    /// Assert a new_message payload's readBy set, order-independent
    pub fn with_read_by(self, expected: Vec<&str>) -> Self {
        let mut actual: Vec<String> =
            serde_json::from_value(self.payload["message"]["readBy"].clone()).unwrap();
        let mut expected: Vec<String> = expected.into_iter().map(String::from).collect();
        actual.sort();
        expected.sort();
        assert_eq!(actual, expected);
        self
    }

    pub fn with_identity(self, expected: &str) -> Self {
        assert_eq!(self.payload["identity"], expected);
        self
    }

    pub fn with_field(self, field: &str, expected: Value) -> Self {
        assert_eq!(self.payload[field], expected, "field {} mismatch", field);
        self
    }
}
