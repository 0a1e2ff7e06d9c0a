//! Queue and message operations
//!
//! The [`Manager`] turns queue/message operations into action calls, keeps the
//! queue cache in step with the service and only writes to it after a remote
//! call has succeeded.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use sqskit_auth::SignatureV2;
use sqskit_core::{ActionCall, Node, Params};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::cache::{QueueCache, QueueStorage};
use crate::client::{ActionResult, Client, ProtocolClient};
use crate::config::Config;
use crate::differ::{AttributeDiffer, QueueAttributeDiffer};
use crate::error::SqsError;
use crate::mapper::{self, MESSAGE_FIELDS, QUEUE_FIELDS};
use crate::model::{Message, Queue};
use crate::transport::HttpTransport;

/// Fields of a received `<Message>` element carried next to its attributes
const MESSAGE_ELEMENTS: [&str; 4] = ["Body", "MessageId", "ReceiptHandle", "MD5OfBody"];

/// Per-URL lock held for the duration of a read-modify-write sequence
///
/// On release the lock entry is forgotten, but only while no other task holds
/// or waits for the same mutex.
struct QueueLock<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    url: String,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for QueueLock<'_> {
    fn drop(&mut self) {
        // One reference in the map, one in our guard
        self.locks
            .remove_if(&self.url, |_, lock| Arc::strong_count(lock) == 2);
    }
}

pub struct Manager {
    client: Arc<dyn ProtocolClient>,
    cache: Arc<dyn QueueCache>,
    differ: Arc<dyn AttributeDiffer>,
    /// Serializes read-modify-write sequences on the same queue URL
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Manager {
    pub fn new(client: Arc<dyn ProtocolClient>) -> Self {
        Self {
            client,
            cache: Arc::new(QueueStorage::new()),
            differ: Arc::new(QueueAttributeDiffer::default()),
            locks: DashMap::new(),
        }
    }

    /// Manager talking HTTP to the endpoint described by `config`
    pub fn from_config(config: &Config) -> Result<Self, SqsError> {
        let transport = HttpTransport::with_timeout(Duration::from_secs(config.timeout_secs))?;
        let signer = SignatureV2::new(config.access_key.clone(), config.secret_key.clone());
        let client = Client::new(config.url(), transport, signer);

        info!(endpoint = %client.endpoint(), "Created SQS manager");
        Ok(Self::new(Arc::new(client)))
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn QueueCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_differ(mut self, differ: Arc<dyn AttributeDiffer>) -> Self {
        self.differ = differ;
        self
    }

    pub fn cache(&self) -> &Arc<dyn QueueCache> {
        &self.cache
    }

    async fn call(&self, call: ActionCall) -> Result<ActionResult, SqsError> {
        debug!(action = %call.action, target = ?call.target, params = call.params.len(), "Calling");
        self.client.call(call).await
    }

    async fn lock(&self, url: &str) -> QueueLock<'_> {
        let lock = self
            .locks
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        QueueLock {
            locks: &self.locks,
            url: url.to_string(),
            _guard: lock.lock_owned().await,
        }
    }

    /// List queues, optionally restricted to names starting with `prefix`
    pub async fn get_queues(
        &self,
        prefix: Option<&str>,
        load_attributes: bool,
    ) -> Result<Vec<Queue>, SqsError> {
        let mut call = ActionCall::new("ListQueues");
        if let Some(prefix) = prefix {
            call.params.insert("QueueNamePrefix", prefix);
        }

        let result = self.call(call).await?;

        // A single URL comes back as a bare element, not a list, and yields
        // no queues here.
        let Some(urls) = result.get("QueueUrl").and_then(Node::as_list) else {
            return Ok(Vec::new());
        };

        let mut queues = Vec::with_capacity(urls.len());
        for url in urls.iter().filter_map(Node::as_text) {
            queues.push(self.get_queue_by_url(url, load_attributes).await?);
        }
        Ok(queues)
    }

    pub async fn get_queue_by_name(
        &self,
        name: &str,
        load_attributes: bool,
    ) -> Result<Option<Queue>, SqsError> {
        let result = self
            .call(ActionCall::new("GetQueueUrl").with_param("QueueName", name))
            .await?;

        match result.text_of("QueueUrl") {
            Some(url) => Ok(Some(self.get_queue_by_url(url, load_attributes).await?)),
            None => Ok(None),
        }
    }

    /// Queue bound to `url`, named after its last path segment
    pub async fn get_queue_by_url(
        &self,
        url: &str,
        load_attributes: bool,
    ) -> Result<Queue, SqsError> {
        let queue = Queue::from_url(url);
        if load_attributes {
            return self.load_queue_attributes(&queue).await;
        }
        Ok(queue)
    }

    /// Create `queue` with every settable attribute set on it
    pub async fn create_queue(&self, queue: &Queue) -> Result<Queue, SqsError> {
        let name = queue.name.as_deref().ok_or(SqsError::MissingName)?;

        let normalized = mapper::normalize(queue)?;
        let attributes: Vec<(&str, String)> = QUEUE_FIELDS
            .iter()
            .filter(|f| f.settable)
            .filter_map(|f| normalized.get(f.field).map(|v| (f.attribute, v.clone())))
            .collect();

        let mut params = Params::new().with("QueueName", name);
        params.push_attributes("Attribute", attributes);

        let result = self
            .call(ActionCall::new("CreateQueue").with_params(params))
            .await?;
        let url = result.text_of("QueueUrl").ok_or(SqsError::UnexpectedResponse {
            action: "CreateQueue",
            field: "QueueUrl",
        })?;

        let mut created = queue.clone();
        created.url = Some(url.to_string());
        self.cache.add(&created)?;

        info!(name = %name, url = %url, "Created queue");
        Ok(created)
    }

    /// Push the attributes that differ from the cached copy
    ///
    /// One SetQueueAttributes call per changed attribute; none when nothing
    /// changed.
    pub async fn update_queue(&self, queue: &Queue) -> Result<Queue, SqsError> {
        let url = queue.bound_url()?;
        let _guard = self.lock(url).await;

        if !self.cache.exists(queue)? {
            return Err(SqsError::NotFound(url.to_string()));
        }
        let cached = self
            .cache
            .get(queue)?
            .ok_or_else(|| SqsError::NotFound(url.to_string()))?;

        let new = mapper::normalize(queue)?;
        let old = mapper::normalize(&cached)?;
        let changes = self.differ.diff(&new, &old);

        for change in &changes {
            self.call(
                ActionCall::new("SetQueueAttributes")
                    .with_param("Attribute.Name", change.name.as_str())
                    .with_param("Attribute.Value", change.value.as_str())
                    .with_target(url),
            )
            .await?;
        }

        self.cache.add(queue)?;
        info!(url = %url, changed = changes.len(), "Updated queue");
        Ok(queue.clone())
    }

    /// Delete the queue; the cache entry goes only if the service confirmed
    pub async fn delete_queue(&self, queue: &Queue) -> Result<bool, SqsError> {
        let url = queue.bound_url()?;
        let _guard = self.lock(url).await;

        let result = self
            .call(ActionCall::new("DeleteQueue").with_target(url))
            .await?;
        if !result.is_truthy() {
            return Ok(false);
        }

        self.cache.remove(queue)?;

        info!(url = %url, "Deleted queue");
        Ok(true)
    }

    /// Send `message`, binding the assigned message id on success
    pub async fn send_message(&self, queue: &Queue, message: &mut Message) -> Result<bool, SqsError> {
        let url = queue.bound_url()?;
        let body = message.body.as_deref().ok_or(SqsError::MissingBody)?;

        let result = self
            .call(
                ActionCall::new("SendMessage")
                    .with_param("MessageBody", body)
                    .with_target(url),
            )
            .await?;

        let Some(message_id) = result.text_of("MessageId") else {
            return Ok(false);
        };

        message.message_id = Some(message_id.to_string());
        if let Some(md5) = result.text_of("MD5OfMessageBody") {
            message.md5_of_body = Some(md5.to_string());
        }

        debug!(url = %url, message_id = %message_id, "Sent message");
        Ok(true)
    }

    /// Receive one message, `None` when the queue had nothing to deliver
    pub async fn receive_message(
        &self,
        queue: &Queue,
        visibility_timeout: Option<u32>,
        load_attributes: bool,
    ) -> Result<Option<Message>, SqsError> {
        let url = queue.bound_url()?;

        let mut call = ActionCall::new("ReceiveMessage").with_target(url);
        if let Some(timeout) = visibility_timeout {
            call.params.insert("VisibilityTimeout", timeout);
        }
        if load_attributes {
            call.params.push_indexed("AttributeName", ["All"]);
        }

        let result = self.call(call).await?;
        let Some(element) = result.get("Message").and_then(|m| m.items().first()) else {
            return Ok(None);
        };

        let mut data = mapper::flatten_attributes(MESSAGE_FIELDS, element.get("Attribute"));
        for key in MESSAGE_ELEMENTS {
            if let Some(value) = element.text_of(key) {
                data.insert(mapper::field_name(MESSAGE_FIELDS, key), value.to_string());
            }
        }

        let mut message: Message = mapper::denormalize(data)?;
        message.queue = Some(queue.clone());

        debug!(url = %url, message_id = ?message.message_id, "Received message");
        Ok(Some(message))
    }

    /// Delete a received message from its queue
    pub async fn delete_message(&self, message: &Message) -> Result<bool, SqsError> {
        let receipt_handle = message
            .receipt_handle
            .as_deref()
            .ok_or(SqsError::MissingReceiptHandle)?;
        let url = message
            .queue
            .as_ref()
            .ok_or(SqsError::UnboundQueue)?
            .bound_url()?;

        let result = self
            .call(
                ActionCall::new("DeleteMessage")
                    .with_param("ReceiptHandle", receipt_handle)
                    .with_target(url),
            )
            .await?;

        Ok(result.is_truthy())
    }

    /// Fetch all attributes and overlay them on `queue`
    ///
    /// Fields the response does not mention keep their current value.
    pub async fn load_queue_attributes(&self, queue: &Queue) -> Result<Queue, SqsError> {
        let url = queue.bound_url()?;
        let _guard = self.lock(url).await;

        let mut params = Params::new();
        params.push_indexed("AttributeName", ["All"]);
        let result = self
            .call(
                ActionCall::new("GetQueueAttributes")
                    .with_params(params)
                    .with_target(url),
            )
            .await?;

        let mut data = mapper::normalize(queue)?;
        data.extend(mapper::flatten_attributes(QUEUE_FIELDS, result.get("Attribute")));

        let loaded: Queue = mapper::denormalize(data)?;
        self.cache.add(&loaded)?;

        debug!(url = %url, "Loaded queue attributes");
        Ok(loaded)
    }
}
