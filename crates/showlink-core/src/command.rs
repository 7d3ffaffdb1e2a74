//! Outbound commands to the show controller.
//!
//! A [`Command`] is what a button press asks for. Encoding it against the
//! current [`Snapshot`] yields one or more [`OutboundMessage`]s; toggles
//! look at the mirrored state to decide which message to send. Every
//! outbound message ends with a `uuid=<id>` tag so the remote can drop
//! duplicates received from redundant network paths.

use rosc::{OscMessage, OscPacket, OscType};
use serde::Serialize;

use crate::error::Result;
use crate::feedback;
use crate::osc_command;
use crate::settings::{Setting, SettingValue};
use crate::state::Snapshot;

/// Where a message goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Every configured show controller.
    AllRemotes,
    /// A single `host:port`.
    Explicit(String),
}

/// A message ready for the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct OutboundMessage {
    pub target: Target,
    pub addr: String,
    pub args: Vec<OscType>,
}

/// A fresh uniqueness tag (`uuid=` plus 8 hex characters).
pub fn unique_tag() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("uuid={}", &id[..8])
}

impl OutboundMessage {
    /// Message to all remotes with the uniqueness tag appended.
    pub fn new(addr: impl Into<String>, args: Vec<OscType>) -> Self {
        Self {
            target: Target::AllRemotes,
            addr: addr.into(),
            args,
        }
        .tagged()
    }

    fn tagged(mut self) -> Self {
        self.args.push(OscType::String(unique_tag()));
        self
    }

    fn bare(addr: &str) -> Self {
        Self::new(addr, Vec::new())
    }

    /// Arguments without the trailing tag.
    pub fn payload(&self) -> &[OscType] {
        match self.args.split_last() {
            Some((OscType::String(tag), rest)) if tag.starts_with("uuid=") => rest,
            _ => &self.args,
        }
    }

    pub fn to_packet(&self) -> OscPacket {
        OscPacket::Message(OscMessage {
            addr: self.addr.clone(),
            args: self.args.clone(),
        })
    }
}

/// Connection-management requests issued by the supervisor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolRequest {
    Subscribe {
        host: String,
        port: u16,
        client_id: String,
        fine_updates: bool,
    },
    GetValues {
        port: Option<u16>,
    },
    Unsubscribe,
}

impl ProtocolRequest {
    pub fn encode(&self) -> OutboundMessage {
        match self {
            ProtocolRequest::Subscribe {
                host,
                port,
                client_id,
                fine_updates,
            } => {
                let mut args = vec![
                    OscType::String(host.clone()),
                    OscType::Int(i32::from(*port)),
                    OscType::String(client_id.clone()),
                ];
                if *fine_updates {
                    args.push(OscType::Bool(true));
                }
                OutboundMessage::new("/subscribe", args)
            }
            ProtocolRequest::GetValues { port } => OutboundMessage::new(
                "/getValues",
                port.iter().map(|p| OscType::Int(i32::from(*p))).collect(),
            ),
            ProtocolRequest::Unsubscribe => OutboundMessage::bare("/unsubscribe"),
        }
    }
}

/// Song or section addressed by 1-based number or by name.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JumpTarget {
    Number(i64),
    Name(String),
}

impl JumpTarget {
    fn to_osc(&self) -> OscType {
        match self {
            JumpTarget::Number(n) => int_arg(*n),
            JumpTarget::Name(name) => OscType::String(name.clone()),
        }
    }
}

/// PlayAUDIO12 scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Pa12Scene {
    A,
    B,
}

/// A button action.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    Play,
    Pause,
    Stop,
    /// Pause while playing, otherwise play.
    PlayPause,
    /// Stop while playing, otherwise play.
    PlayStop,
    Record,
    StopRecording,
    ToggleRecording,
    EnableLoop,
    EscapeLoop,
    /// Escape while inside an active loop, otherwise enable.
    ToggleLoop,
    JumpToSong { target: JumpTarget },
    JumpBySongs { steps: i64, force: bool },
    JumpToSection { target: JumpTarget },
    JumpBySections { steps: i64, force: bool },
    PlayCuedSong,
    Pa12SetScene { scene: Pa12Scene },
    Pa12ToggleScene,
    /// Flip a boolean setting based on its mirrored value.
    ToggleSetting { setting: Setting },
    SetSetting { setting: Setting, value: SettingValue },
    /// Free-form `[host:port]/address args; ...`.
    SendOscCommand { command: String },
}

/// OSC ints are 32 bit; out-of-range values saturate.
fn int_arg(n: i64) -> OscType {
    OscType::Int(i32::try_from(n).unwrap_or(if n < 0 { i32::MIN } else { i32::MAX }))
}

fn force_arg(force: bool) -> OscType {
    OscType::String(format!("force={}", force))
}

fn setting_arg(value: &SettingValue) -> OscType {
    match value {
        SettingValue::Bool(b) => OscType::Int(i32::from(*b)),
        SettingValue::Int(n) => int_arg(*n),
        SettingValue::Text(s) => OscType::String(s.clone()),
    }
}

impl Command {
    /// Messages implementing this command given the current state.
    pub fn encode(&self, s: &Snapshot) -> Result<Vec<OutboundMessage>> {
        let playing = s.transport.is_playing;
        let message = match self {
            Command::Play => OutboundMessage::bare("/global/play"),
            Command::Pause => OutboundMessage::bare("/global/pause"),
            Command::Stop => OutboundMessage::bare("/global/stop"),
            Command::PlayPause if playing => OutboundMessage::bare("/global/pause"),
            Command::PlayStop if playing => OutboundMessage::bare("/global/stop"),
            Command::PlayPause | Command::PlayStop => OutboundMessage::bare("/global/play"),
            Command::Record => OutboundMessage::bare("/global/record"),
            Command::StopRecording => OutboundMessage::bare("/global/stopRecording"),
            Command::ToggleRecording => OutboundMessage::bare("/global/toggleRecording"),
            Command::EnableLoop => OutboundMessage::bare("/setlist/enableLoop"),
            Command::EscapeLoop => OutboundMessage::bare("/setlist/escapeLoop"),
            Command::ToggleLoop if feedback::is_in_active_loop(s) => {
                OutboundMessage::bare("/setlist/escapeLoop")
            }
            Command::ToggleLoop => OutboundMessage::bare("/setlist/enableLoop"),
            Command::JumpToSong { target } => {
                OutboundMessage::new("/setlist/jumpToSong", vec![target.to_osc()])
            }
            Command::JumpBySongs { steps, force } => OutboundMessage::new(
                "/setlist/jumpBySongs",
                vec![int_arg(*steps), force_arg(*force)],
            ),
            Command::JumpToSection { target } => {
                OutboundMessage::new("/setlist/jumpToSection", vec![target.to_osc()])
            }
            Command::JumpBySections { steps, force } => OutboundMessage::new(
                "/setlist/jumpBySections",
                vec![int_arg(*steps), force_arg(*force)],
            ),
            Command::PlayCuedSong => OutboundMessage::bare("/setlist/playCuedSong"),
            Command::Pa12SetScene { scene } => {
                let name = match scene {
                    Pa12Scene::A => "A",
                    Pa12Scene::B => "B",
                };
                OutboundMessage::new(
                    "/playaudio12/setScene",
                    vec![OscType::String(name.to_string())],
                )
            }
            Command::Pa12ToggleScene => OutboundMessage::bare("/playaudio12/toggleScene"),
            Command::ToggleSetting { setting } => {
                let current = matches!(s.settings.get(*setting), Some(SettingValue::Bool(true)));
                OutboundMessage::new(setting.address(), vec![OscType::Int(i32::from(!current))])
            }
            Command::SetSetting { setting, value } => {
                OutboundMessage::new(setting.address(), vec![setting_arg(value)])
            }
            Command::SendOscCommand { command } => {
                return Ok(osc_command::parse_osc_commands(command)?
                    .into_iter()
                    .map(|cmd| {
                        let mut message = OutboundMessage::new(cmd.address, cmd.args);
                        if let Some(target) = cmd.target {
                            message.target = Target::Explicit(target);
                        }
                        message
                    })
                    .collect());
            }
        };
        Ok(vec![message])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_one(command: Command, s: &Snapshot) -> OutboundMessage {
        let mut messages = command.encode(s).unwrap();
        assert_eq!(messages.len(), 1);
        messages.remove(0)
    }

    #[test]
    fn test_every_message_is_tagged() {
        let message = encode_one(Command::Play, &Snapshot::new());
        assert_eq!(message.addr, "/global/play");
        match message.args.last() {
            Some(OscType::String(tag)) => {
                assert!(tag.starts_with("uuid="));
                assert_eq!(tag.len(), "uuid=".len() + 8);
            }
            other => panic!("missing tag: {:?}", other),
        }
        assert!(message.payload().is_empty());
    }

    #[test]
    fn test_tags_are_unique() {
        assert_ne!(unique_tag(), unique_tag());
    }

    #[test]
    fn test_play_toggles_follow_state() {
        let mut s = Snapshot::new();
        assert_eq!(encode_one(Command::PlayPause, &s).addr, "/global/play");
        assert_eq!(encode_one(Command::PlayStop, &s).addr, "/global/play");
        s.transport.is_playing = true;
        assert_eq!(encode_one(Command::PlayPause, &s).addr, "/global/pause");
        assert_eq!(encode_one(Command::PlayStop, &s).addr, "/global/stop");
    }

    #[test]
    fn test_toggle_loop() {
        let mut s = Snapshot::new();
        assert_eq!(encode_one(Command::ToggleLoop, &s).addr, "/setlist/enableLoop");
        s.setlist.loop_enabled = true;
        s.setlist.loop_start = Some(0.0);
        s.setlist.loop_end = Some(8.0);
        s.transport.beats_position = 4.0;
        assert_eq!(encode_one(Command::ToggleLoop, &s).addr, "/setlist/escapeLoop");
    }

    #[test]
    fn test_jump_arguments() {
        let s = Snapshot::new();
        let message = encode_one(Command::JumpBySongs { steps: -1, force: true }, &s);
        assert_eq!(
            message.payload(),
            &[OscType::Int(-1), OscType::String("force=true".into())]
        );

        let message = encode_one(
            Command::JumpToSection {
                target: JumpTarget::Name("Chorus".into()),
            },
            &s,
        );
        assert_eq!(message.payload(), &[OscType::String("Chorus".into())]);
    }

    #[test]
    fn test_wide_integers_saturate() {
        let s = Snapshot::new();
        let message = encode_one(
            Command::JumpBySections {
                steps: i64::from(i32::MAX) + 5,
                force: false,
            },
            &s,
        );
        assert_eq!(message.payload()[0], OscType::Int(i32::MAX));

        let message = encode_one(
            Command::JumpToSong {
                target: JumpTarget::Number(i64::MIN),
            },
            &s,
        );
        assert_eq!(message.payload(), &[OscType::Int(i32::MIN)]);

        let message = encode_one(
            Command::SetSetting {
                setting: Setting::CountInDuration,
                value: SettingValue::Int(1 << 40),
            },
            &s,
        );
        assert_eq!(message.payload(), &[OscType::Int(i32::MAX)]);
    }

    #[test]
    fn test_toggle_setting_negates_mirror() {
        let mut s = Snapshot::new();
        let toggle = Command::ToggleSetting {
            setting: Setting::SafeMode,
        };
        let message = encode_one(toggle.clone(), &s);
        assert_eq!(message.addr, "/settings/safeMode");
        assert_eq!(message.payload(), &[OscType::Int(1)]);

        s.settings.set(Setting::SafeMode, SettingValue::Bool(true));
        assert_eq!(encode_one(toggle, &s).payload(), &[OscType::Int(0)]);
    }

    #[test]
    fn test_set_setting_values() {
        let s = Snapshot::new();
        let message = encode_one(
            Command::SetSetting {
                setting: Setting::JumpMode,
                value: SettingValue::Text("manual".into()),
            },
            &s,
        );
        assert_eq!(message.payload(), &[OscType::String("manual".into())]);

        let message = encode_one(
            Command::SetSetting {
                setting: Setting::Autoplay,
                value: SettingValue::Bool(true),
            },
            &s,
        );
        assert_eq!(message.payload(), &[OscType::Int(1)]);
    }

    #[test]
    fn test_raw_commands() {
        let s = Snapshot::new();
        let messages = Command::SendOscCommand {
            command: "127.0.0.1:9000/foo 1; /global/play".into(),
        }
        .encode(&s)
        .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].target, Target::Explicit("127.0.0.1:9000".into()));
        assert_eq!(messages[0].payload(), &[OscType::Int(1)]);
        assert_eq!(messages[1].target, Target::AllRemotes);

        assert!(Command::SendOscCommand {
            command: "nothing".into()
        }
        .encode(&s)
        .is_err());
    }

    #[test]
    fn test_protocol_requests() {
        let subscribe = ProtocolRequest::Subscribe {
            host: "auto".into(),
            port: 39052,
            client_id: "showlink".into(),
            fine_updates: true,
        }
        .encode();
        assert_eq!(subscribe.addr, "/subscribe");
        assert_eq!(
            subscribe.payload(),
            &[
                OscType::String("auto".into()),
                OscType::Int(39052),
                OscType::String("showlink".into()),
                OscType::Bool(true),
            ]
        );

        let get_values = ProtocolRequest::GetValues { port: None }.encode();
        assert!(get_values.payload().is_empty());
        assert_eq!(ProtocolRequest::Unsubscribe.encode().addr, "/unsubscribe");
    }
}
