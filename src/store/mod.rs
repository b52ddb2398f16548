//! In-memory device, message and endpoint records.

pub mod models;

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::config::Config;
use crate::notify::NotificationTarget;
use crate::sanitize;

pub use models::{
    Device, DeviceDetail, DeviceSummary, DeviceUpdate, EndpointInput, EndpointRecord, Message,
    NewDevice, PublicDevice,
};

const CODE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const CODE_LEN: usize = 8;
const CODE_ATTEMPTS: usize = 16;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} not found")]
    NotFound { kind: &'static str },

    #[error("Device code already in use: {0}")]
    DuplicateCode(String),

    #[error("Could not allocate a unique device code")]
    CodeExhausted,

    #[error("Store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct Records {
    devices: HashMap<Uuid, Device>,
    messages: Vec<Message>,
    endpoints: Vec<EndpointRecord>,
}

impl Records {
    fn code_taken(&self, code: &str) -> bool {
        self.devices.values().any(|device| device.unique_code == code)
    }

    fn fresh_code(&self) -> Result<String, StoreError> {
        for _ in 0..CODE_ATTEMPTS {
            let code = generate_code();
            if !self.code_taken(&code) {
                return Ok(code);
            }
        }
        Err(StoreError::CodeExhausted)
    }

    fn messages_for(&self, device_id: Uuid) -> Vec<Message> {
        // Insertion order is creation order.
        self.messages
            .iter()
            .filter(|message| message.device_id == device_id)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct Store {
    records: RwLock<Records>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds devices and global endpoints from config.
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store = Self::new();
        for seed in &config.devices {
            store.create_device(NewDevice {
                name: sanitize::sanitize_device_name(&seed.name),
                description: seed
                    .description
                    .as_deref()
                    .map(sanitize::sanitize_description),
                notification_url: seed
                    .notification_url
                    .as_deref()
                    .and_then(sanitize::sanitize_descriptor),
                code: seed.code.clone(),
            })?;
        }
        for endpoint in &config.notifications.endpoints {
            store.create_endpoint(&endpoint.name, &endpoint.url)?;
        }
        Ok(store)
    }

    pub fn create_device(&self, input: NewDevice) -> Result<Device, StoreError> {
        let mut records = self.write()?;
        let unique_code = match input.code {
            Some(code) => {
                let code = code.to_ascii_lowercase();
                if records.code_taken(&code) {
                    return Err(StoreError::DuplicateCode(code));
                }
                code
            }
            None => records.fresh_code()?,
        };

        let now = Utc::now();
        let device = Device {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            unique_code,
            notification_url: input.notification_url,
            created_at: now,
            updated_at: now,
        };
        records.devices.insert(device.id, device.clone());
        Ok(device)
    }

    /// Newest first, with message counts.
    pub fn list_devices(&self) -> Result<Vec<DeviceSummary>, StoreError> {
        let records = self.read()?;
        let mut devices: Vec<DeviceSummary> = records
            .devices
            .values()
            .map(|device| DeviceSummary {
                device: device.clone(),
                message_count: records
                    .messages
                    .iter()
                    .filter(|message| message.device_id == device.id)
                    .count(),
            })
            .collect();
        devices.sort_by(|a, b| b.device.created_at.cmp(&a.device.created_at));
        Ok(devices)
    }

    pub fn device(&self, id: Uuid) -> Result<DeviceDetail, StoreError> {
        let records = self.read()?;
        let device = records
            .devices
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "Device" })?;
        let messages = records.messages_for(id);
        Ok(DeviceDetail { device, messages })
    }

    /// Codes are stored lower-cased, so lookup ignores case.
    pub fn device_by_code(&self, code: &str) -> Result<DeviceDetail, StoreError> {
        let code = code.trim().to_ascii_lowercase();
        let records = self.read()?;
        let device = records
            .devices
            .values()
            .find(|device| device.unique_code == code)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "Device" })?;
        let messages = records.messages_for(device.id);
        Ok(DeviceDetail { device, messages })
    }

    pub fn update_device(&self, id: Uuid, update: DeviceUpdate) -> Result<Device, StoreError> {
        let mut records = self.write()?;
        let device = records
            .devices
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: "Device" })?;
        if let Some(name) = update.name {
            device.name = name;
        }
        if let Some(description) = update.description {
            device.description = description;
        }
        if let Some(url) = update.notification_url {
            device.notification_url = url;
        }
        device.updated_at = Utc::now();
        Ok(device.clone())
    }

    /// Removes the device and its messages.
    pub fn delete_device(&self, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.write()?;
        records
            .devices
            .remove(&id)
            .ok_or(StoreError::NotFound { kind: "Device" })?;
        records.messages.retain(|message| message.device_id != id);
        Ok(())
    }

    pub fn regenerate_code(&self, id: Uuid) -> Result<Device, StoreError> {
        let mut records = self.write()?;
        if !records.devices.contains_key(&id) {
            return Err(StoreError::NotFound { kind: "Device" });
        }
        let code = records.fresh_code()?;
        let device = records
            .devices
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: "Device" })?;
        device.unique_code = code;
        device.updated_at = Utc::now();
        Ok(device.clone())
    }

    pub fn add_message(
        &self,
        device_id: Uuid,
        nickname: String,
        message: String,
        is_owner_reply: bool,
    ) -> Result<Message, StoreError> {
        let mut records = self.write()?;
        if !records.devices.contains_key(&device_id) {
            return Err(StoreError::NotFound { kind: "Device" });
        }
        let message = Message {
            id: Uuid::new_v4(),
            device_id,
            nickname,
            message,
            is_owner_reply,
            created_at: Utc::now(),
        };
        records.messages.push(message.clone());
        Ok(message)
    }

    pub fn clear_messages(&self, device_id: Uuid) -> Result<(), StoreError> {
        let mut records = self.write()?;
        if !records.devices.contains_key(&device_id) {
            return Err(StoreError::NotFound { kind: "Device" });
        }
        records.messages.retain(|message| message.device_id != device_id);
        Ok(())
    }

    pub fn endpoints(&self) -> Result<Vec<EndpointRecord>, StoreError> {
        Ok(self.read()?.endpoints.clone())
    }

    pub fn endpoint(&self, id: Uuid) -> Result<EndpointRecord, StoreError> {
        self.read()?
            .endpoints
            .iter()
            .find(|endpoint| endpoint.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "Endpoint" })
    }

    pub fn create_endpoint(&self, name: &str, url: &str) -> Result<EndpointRecord, StoreError> {
        let endpoint = EndpointRecord {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            url: url.trim().to_string(),
            created_at: Utc::now(),
        };
        self.write()?.endpoints.push(endpoint.clone());
        Ok(endpoint)
    }

    pub fn update_endpoint(
        &self,
        id: Uuid,
        name: &str,
        url: &str,
    ) -> Result<EndpointRecord, StoreError> {
        let mut records = self.write()?;
        let endpoint = records
            .endpoints
            .iter_mut()
            .find(|endpoint| endpoint.id == id)
            .ok_or(StoreError::NotFound { kind: "Endpoint" })?;
        endpoint.name = name.trim().to_string();
        endpoint.url = url.trim().to_string();
        Ok(endpoint.clone())
    }

    pub fn delete_endpoint(&self, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.write()?;
        let before = records.endpoints.len();
        records.endpoints.retain(|endpoint| endpoint.id != id);
        if records.endpoints.len() == before {
            return Err(StoreError::NotFound { kind: "Endpoint" });
        }
        Ok(())
    }

    /// The device's own endpoint first, then every global endpoint.
    pub fn notification_targets(&self, device: &Device) -> Result<Vec<NotificationTarget>, StoreError> {
        let records = self.read()?;
        let device_target = device
            .notification_url
            .as_ref()
            .map(|url| NotificationTarget::new(format!("device:{}", device.name), url.clone()));
        let globals = records
            .endpoints
            .iter()
            .map(|endpoint| NotificationTarget::new(endpoint.name.clone(), endpoint.url.clone()));
        Ok(device_target.into_iter().chain(globals).collect())
    }

    /// False once a writer panicked while holding the lock.
    pub fn is_healthy(&self) -> bool {
        !self.records.is_poisoned()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Records>, StoreError> {
        self.records.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Records>, StoreError> {
        self.records.write().map_err(|_| StoreError::Poisoned)
    }
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeviceSeed, EndpointConfig};

    fn keys(store: &Store) -> Device {
        store
            .create_device(NewDevice {
                name: "Keys".to_string(),
                notification_url: Some("ntfy://keys".to_string()),
                ..NewDevice::default()
            })
            .unwrap()
    }

    #[test]
    fn generated_codes_use_lowercase_alphanumerics() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), 8);
            assert!(code.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
        }
    }

    #[test]
    fn device_lookup_by_code_includes_messages_in_order() {
        let store = Store::new();
        let device = keys(&store);
        store
            .add_message(device.id, "Sam".into(), "first".into(), false)
            .unwrap();
        store
            .add_message(device.id, "Owner".into(), "second".into(), true)
            .unwrap();

        let detail = store.device_by_code(&device.unique_code).unwrap();
        let texts: Vec<&str> = detail.messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert_eq!(
            store.device_by_code("missing0").unwrap_err(),
            StoreError::NotFound { kind: "Device" }
        );
    }

    #[test]
    fn regenerate_code_changes_public_code() {
        let store = Store::new();
        let device = keys(&store);
        let updated = store.regenerate_code(device.id).unwrap();
        assert_ne!(updated.unique_code, device.unique_code);
        assert!(store.device_by_code(&device.unique_code).is_err());
    }

    #[test]
    fn delete_device_drops_messages() {
        let store = Store::new();
        let device = keys(&store);
        store
            .add_message(device.id, "Sam".into(), "hi".into(), false)
            .unwrap();
        store.delete_device(device.id).unwrap();

        assert!(store.list_devices().unwrap().is_empty());
        assert!(store.add_message(device.id, "a".into(), "b".into(), false).is_err());
    }

    #[test]
    fn update_device_applies_partial_changes() {
        let store = Store::new();
        let device = keys(&store);
        let updated = store
            .update_device(
                device.id,
                DeviceUpdate {
                    notification_url: Some(None),
                    ..DeviceUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Keys");
        assert_eq!(updated.notification_url, None);
    }

    #[test]
    fn targets_put_device_endpoint_first() {
        let store = Store::new();
        let device = keys(&store);
        store.create_endpoint("phone", "tgram://t/1").unwrap();
        store.create_endpoint("desk", "slack://a/b/c").unwrap();

        let targets = store.notification_targets(&device).unwrap();
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["device:Keys", "phone", "desk"]);
        assert_eq!(targets[0].descriptor, "ntfy://keys");
    }

    #[test]
    fn endpoint_crud() {
        let store = Store::new();
        let endpoint = store.create_endpoint(" phone ", " ntfy://a ").unwrap();
        assert_eq!(endpoint.name, "phone");
        assert_eq!(endpoint.url, "ntfy://a");

        let updated = store.update_endpoint(endpoint.id, "tablet", "ntfy://b").unwrap();
        assert_eq!(store.endpoint(endpoint.id).unwrap(), updated);

        store.delete_endpoint(endpoint.id).unwrap();
        assert_eq!(
            store.delete_endpoint(endpoint.id).unwrap_err(),
            StoreError::NotFound { kind: "Endpoint" }
        );
    }

    #[test]
    fn seeds_from_config_and_rejects_duplicate_codes() {
        let mut config = Config::default();
        config.devices = vec![DeviceSeed {
            name: "Bag <blue>".to_string(),
            code: Some("BAG00001".to_string()),
            notification_url: Some("gopher://nope".to_string()),
            ..DeviceSeed::default()
        }];
        config.notifications.endpoints = vec![EndpointConfig {
            name: "phone".to_string(),
            url: "ntfy://alerts".to_string(),
        }];

        let store = Store::from_config(&config).unwrap();
        let detail = store.device_by_code("bag00001").unwrap();
        assert_eq!(detail.device.name, "Bag &lt;blue&gt;");
        assert_eq!(detail.device.notification_url, None);
        assert_eq!(store.endpoints().unwrap().len(), 1);

        config.devices.push(config.devices[0].clone());
        assert_eq!(
            Store::from_config(&config).unwrap_err(),
            StoreError::DuplicateCode("bag00001".to_string())
        );
    }
}
