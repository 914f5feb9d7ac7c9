//! Invitations to meet for a coffee.
//!
//! Sending is local and always succeeds: an [`Invitation`] is built, stored in
//! the session's [`Outbox`] and confirmed to the viewer. Nothing is delivered
//! anywhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  person::{Category, Person, PersonId},
};

/// Who sent an invitation. The viewer has no directory entry of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
  Viewer,
  Person(PersonId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
  Pending,
  Accepted,
  Declined,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
  pub invitation_id:  Uuid,
  pub sender:         Sender,
  pub recipient:      PersonId,
  pub recipient_name: String,
  pub message:        String,
  pub sent_at:        DateTime<Utc>,
  pub status:         InvitationStatus,
}

impl Invitation {
  /// Build a pending invitation from the viewer to `person`.
  pub fn to_person(person: &Person, sent_at: DateTime<Utc>) -> Self {
    Self {
      invitation_id: Uuid::new_v4(),
      sender: Sender::Viewer,
      recipient: person.id,
      recipient_name: person.name.clone(),
      message: compose_message(person),
      sent_at,
      status: InvitationStatus::Pending,
    }
  }

  /// Line shown to the viewer once the invitation is created.
  pub fn confirmation(&self) -> String {
    format!("Invitation sent to {}!", self.recipient_name)
  }

  pub fn accept(&mut self) -> Result<()> { self.respond(InvitationStatus::Accepted) }

  pub fn decline(&mut self) -> Result<()> { self.respond(InvitationStatus::Declined) }

  fn respond(&mut self, status: InvitationStatus) -> Result<()> {
    if self.status != InvitationStatus::Pending {
      return Err(Error::AlreadyResponded(self.invitation_id));
    }
    self.status = status;
    Ok(())
  }
}

fn compose_message(person: &Person) -> String {
  let purpose = match person.category {
    Category::Business => "to talk business",
    Category::Friendly => "for a friendly chat",
  };
  format!(
    "Hi {},\n\nI'm nearby and would love to share a coffee with you, {purpose}.\n\n\
     See you soon,\nA CatchinCup user",
    person.name
  )
}

/// Invitations sent during this session, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
  sent: Vec<Invitation>,
}

impl Outbox {
  pub fn new() -> Self { Self::default() }

  /// Create an invitation to `person`, store it, and return it.
  pub fn invite(&mut self, person: &Person, now: DateTime<Utc>) -> &Invitation {
    let invitation = Invitation::to_person(person, now);
    tracing::info!(
      invitation_id = %invitation.invitation_id,
      recipient = %person.id,
      "invitation created"
    );
    self.sent.push(invitation);
    // Just pushed; the vector is non-empty.
    &self.sent[self.sent.len() - 1]
  }

  pub fn sent(&self) -> &[Invitation] { &self.sent }

  pub fn get_mut(&mut self, id: Uuid) -> Result<&mut Invitation> {
    self
      .sent
      .iter_mut()
      .find(|i| i.invitation_id == id)
      .ok_or(Error::InvitationNotFound(id))
  }

  /// Invitations still waiting for an answer from `recipient`.
  pub fn pending_for(&self, recipient: PersonId) -> usize {
    self
      .sent
      .iter()
      .filter(|i| i.recipient == recipient && i.status == InvitationStatus::Pending)
      .count()
  }
}
