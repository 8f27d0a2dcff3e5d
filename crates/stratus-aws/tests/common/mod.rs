//! In-memory fakes for the service client traits
//!
//! Each fake keeps its control-plane state behind a `Mutex` and models the
//! asynchronous transitions the real services exhibit (a consumer passing
//! through CREATING, an accelerator re-deploying after a mutation, IAM
//! propagation failures) as poll counters the tests configure.

// not every test binary uses every fake
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use stratus_aws::directconnect::api::*;
use stratus_aws::directconnect::DirectConnectApi;
use stratus_aws::ecrpublic::api::*;
use stratus_aws::ecrpublic::EcrPublicApi;
use stratus_aws::globalaccelerator::api::*;
use stratus_aws::globalaccelerator::GlobalAcceleratorApi;
use stratus_aws::kinesis::api::*;
use stratus_aws::kinesis::KinesisApi;
use stratus_aws::pinpoint::api::*;
use stratus_aws::pinpoint::PinpointApi;
use stratus_aws::ssm::api::*;
use stratus_aws::ssm::SsmApi;
use stratus_core::{ApiError, ClientRegistry, ClientRegistryBuilder, ProviderContext};

pub const REGION: &str = "us-west-2";

pub fn context(builder: ClientRegistryBuilder) -> ProviderContext {
    ProviderContext::new(builder.build(), REGION, "aws")
}

pub fn registry() -> ClientRegistryBuilder {
    ClientRegistry::builder()
}

// ---- SSM ----

#[derive(Default)]
pub struct FakeSsm {
    pub mappings: Mutex<Vec<PatchGroupMapping>>,
    /// Mappings per page of DescribePatchGroups; 0 means everything at once
    pub page_size: usize,
    /// Region-level error returned by every call when set
    pub region_error: Mutex<Option<ApiError>>,
}

impl FakeSsm {
    pub fn seed(&self, patch_group: &str, baseline_id: &str) {
        self.mappings.lock().unwrap().push(PatchGroupMapping {
            patch_group: patch_group.to_string(),
            baseline_id: baseline_id.to_string(),
            operating_system: Some("AMAZON_LINUX_2".to_string()),
        });
    }

    pub fn contains(&self, patch_group: &str, baseline_id: &str) -> bool {
        self.mappings
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.patch_group == patch_group && m.baseline_id == baseline_id)
    }
}

#[async_trait]
impl SsmApi for FakeSsm {
    async fn register_patch_baseline_for_patch_group(
        &self,
        input: RegisterPatchBaselineForPatchGroupInput,
    ) -> Result<(), ApiError> {
        if let Some(err) = self.region_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.mappings.lock().unwrap().push(PatchGroupMapping {
            patch_group: input.patch_group,
            baseline_id: input.baseline_id,
            operating_system: None,
        });
        Ok(())
    }

    async fn describe_patch_groups(
        &self,
        input: DescribePatchGroupsInput,
    ) -> Result<DescribePatchGroupsOutput, ApiError> {
        if let Some(err) = self.region_error.lock().unwrap().clone() {
            return Err(err);
        }
        let mappings = self.mappings.lock().unwrap();
        let page_size = if self.page_size == 0 {
            mappings.len().max(1)
        } else {
            self.page_size
        };
        let start: usize = input
            .next_token
            .as_deref()
            .map(|t| t.parse().unwrap())
            .unwrap_or(0);
        let end = (start + page_size).min(mappings.len());
        Ok(DescribePatchGroupsOutput {
            mappings: mappings[start..end].to_vec(),
            next_token: (end < mappings.len()).then(|| end.to_string()),
        })
    }

    async fn deregister_patch_baseline_for_patch_group(
        &self,
        input: DeregisterPatchBaselineForPatchGroupInput,
    ) -> Result<(), ApiError> {
        let mut mappings = self.mappings.lock().unwrap();
        let before = mappings.len();
        mappings
            .retain(|m| !(m.patch_group == input.patch_group && m.baseline_id == input.baseline_id));
        if mappings.len() == before {
            return Err(ApiError::new("DoesNotExistException", "no such registration"));
        }
        Ok(())
    }
}

// ---- Kinesis ----

pub struct FakeConsumer {
    pub description: ConsumerDescription,
    pub polls_until_active: u32,
    pub polls_until_gone: Option<u32>,
}

#[derive(Default)]
pub struct FakeKinesis {
    pub consumers: Mutex<BTreeMap<String, FakeConsumer>>,
    /// Describe calls a fresh consumer answers CREATING before ACTIVE
    pub creating_polls: u32,
    /// Describe calls a deregistered consumer answers DELETING before gone
    pub deleting_polls: u32,
    pub deregistered: Mutex<Vec<String>>,
}

impl FakeKinesis {
    pub fn with_transitions(creating_polls: u32, deleting_polls: u32) -> Self {
        Self {
            creating_polls,
            deleting_polls,
            ..Default::default()
        }
    }

    pub fn seed_active(&self, stream_arn: &str, name: &str) -> String {
        let arn = format!("{stream_arn}/consumer/{name}");
        self.consumers.lock().unwrap().insert(
            arn.clone(),
            FakeConsumer {
                description: ConsumerDescription {
                    consumer_arn: arn.clone(),
                    consumer_name: name.to_string(),
                    stream_arn: stream_arn.to_string(),
                    status: "ACTIVE".to_string(),
                    creation_timestamp: chrono::Utc::now(),
                },
                polls_until_active: 0,
                polls_until_gone: None,
            },
        );
        arn
    }
}

fn consumer_not_found() -> ApiError {
    ApiError::new("ResourceNotFoundException", "consumer not found")
}

#[async_trait]
impl KinesisApi for FakeKinesis {
    async fn register_stream_consumer(
        &self,
        input: RegisterStreamConsumerInput,
    ) -> Result<RegisterStreamConsumerOutput, ApiError> {
        let arn = format!("{}/consumer/{}", input.stream_arn, input.consumer_name);
        let description = ConsumerDescription {
            consumer_arn: arn.clone(),
            consumer_name: input.consumer_name,
            stream_arn: input.stream_arn,
            status: "CREATING".to_string(),
            creation_timestamp: chrono::Utc::now(),
        };
        self.consumers.lock().unwrap().insert(
            arn,
            FakeConsumer {
                description: description.clone(),
                polls_until_active: self.creating_polls,
                polls_until_gone: None,
            },
        );
        Ok(RegisterStreamConsumerOutput {
            consumer: description,
        })
    }

    async fn describe_stream_consumer(
        &self,
        input: DescribeStreamConsumerInput,
    ) -> Result<ConsumerDescription, ApiError> {
        let arn = input.consumer_arn.ok_or_else(consumer_not_found)?;
        let mut consumers = self.consumers.lock().unwrap();
        let Some(consumer) = consumers.get_mut(&arn) else {
            return Err(consumer_not_found());
        };

        if let Some(remaining) = consumer.polls_until_gone {
            if remaining == 0 {
                consumers.remove(&arn);
                return Err(consumer_not_found());
            }
            consumer.polls_until_gone = Some(remaining - 1);
            consumer.description.status = "DELETING".to_string();
        } else if consumer.polls_until_active > 0 {
            consumer.polls_until_active -= 1;
            consumer.description.status = "CREATING".to_string();
        } else {
            consumer.description.status = "ACTIVE".to_string();
        }
        Ok(consumer.description.clone())
    }

    async fn deregister_stream_consumer(
        &self,
        input: DeregisterStreamConsumerInput,
    ) -> Result<(), ApiError> {
        let mut consumers = self.consumers.lock().unwrap();
        let Some(consumer) = consumers.get_mut(&input.consumer_arn) else {
            return Err(consumer_not_found());
        };
        consumer.polls_until_gone = Some(self.deleting_polls);
        self.deregistered
            .lock()
            .unwrap()
            .push(consumer.description.consumer_name.clone());
        Ok(())
    }

    async fn list_streams(&self, _input: ListStreamsInput) -> Result<ListStreamsOutput, ApiError> {
        let mut stream_arns: Vec<String> = self
            .consumers
            .lock()
            .unwrap()
            .values()
            .map(|c| c.description.stream_arn.clone())
            .collect();
        stream_arns.sort();
        stream_arns.dedup();
        Ok(ListStreamsOutput {
            stream_arns,
            next_token: None,
        })
    }

    async fn list_stream_consumers(
        &self,
        input: ListStreamConsumersInput,
    ) -> Result<ListStreamConsumersOutput, ApiError> {
        let consumers = self
            .consumers
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.description.stream_arn == input.stream_arn)
            .map(|c| c.description.clone())
            .collect();
        Ok(ListStreamConsumersOutput {
            consumers,
            next_token: None,
        })
    }
}

// ---- Pinpoint ----

#[derive(Default)]
pub struct FakePinpoint {
    pub stream: Mutex<Option<EventStreamDescription>>,
    /// Number of puts that fail with the IAM propagation message first
    pub propagation_failures: AtomicU32,
    pub put_calls: AtomicU32,
    /// When set, every put fails with this error instead
    pub put_error: Mutex<Option<ApiError>>,
}

#[async_trait]
impl PinpointApi for FakePinpoint {
    async fn put_event_stream(
        &self,
        input: PutEventStreamInput,
    ) -> Result<EventStreamDescription, ApiError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.put_error.lock().unwrap().clone() {
            return Err(err);
        }
        let remaining = self.propagation_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.propagation_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ApiError::new(
                "BadRequestException",
                "Unable to assume the role: make sure the IAM Role is configured correctly",
            ));
        }
        let description = EventStreamDescription {
            application_id: input.application_id,
            destination_stream_arn: input.destination_stream_arn,
            role_arn: input.role_arn,
        };
        *self.stream.lock().unwrap() = Some(description.clone());
        Ok(description)
    }

    async fn get_event_stream(
        &self,
        input: GetEventStreamInput,
    ) -> Result<EventStreamDescription, ApiError> {
        match self.stream.lock().unwrap().clone() {
            Some(stream) if stream.application_id == input.application_id => Ok(stream),
            _ => Err(ApiError::new("NotFoundException", "no event stream")),
        }
    }

    async fn delete_event_stream(&self, input: DeleteEventStreamInput) -> Result<(), ApiError> {
        let mut stream = self.stream.lock().unwrap();
        match stream.as_ref() {
            Some(s) if s.application_id == input.application_id => {
                *stream = None;
                Ok(())
            }
            _ => Err(ApiError::new("NotFoundException", "no event stream")),
        }
    }
}

// ---- Direct Connect ----

pub struct FakeAssociation {
    pub description: AssociationDescription,
    pub polls_until_associated: u32,
    pub polls_until_gone: Option<u32>,
    /// Only listed via the virtual_gateway_id reverse index
    pub reverse_index_only: bool,
}

#[derive(Default)]
pub struct FakeDirectConnect {
    pub associations: Mutex<BTreeMap<String, FakeAssociation>>,
    pub associating_polls: u32,
    pub disassociating_polls: u32,
    pub next_id: AtomicU32,
}

impl FakeDirectConnect {
    pub fn with_transitions(associating_polls: u32, disassociating_polls: u32) -> Self {
        Self {
            associating_polls,
            disassociating_polls,
            ..Default::default()
        }
    }

    pub fn seed_associated(
        &self,
        dx_gateway_id: &str,
        associated_gateway_id: &str,
        reverse_index_only: bool,
    ) -> String {
        let id = format!(
            "ga-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        );
        self.associations.lock().unwrap().insert(
            id.clone(),
            FakeAssociation {
                description: AssociationDescription {
                    association_id: id.clone(),
                    dx_gateway_id: dx_gateway_id.to_string(),
                    associated_gateway_id: associated_gateway_id.to_string(),
                    association_state: "associated".to_string(),
                },
                polls_until_associated: 0,
                polls_until_gone: None,
                reverse_index_only,
            },
        );
        id
    }
}

fn advance_association(assoc: &mut FakeAssociation) -> Option<AssociationDescription> {
    if let Some(remaining) = assoc.polls_until_gone {
        if remaining == 0 {
            return None;
        }
        assoc.polls_until_gone = Some(remaining - 1);
        assoc.description.association_state = "disassociating".to_string();
    } else if assoc.polls_until_associated > 0 {
        assoc.polls_until_associated -= 1;
        assoc.description.association_state = "associating".to_string();
    } else {
        assoc.description.association_state = "associated".to_string();
    }
    Some(assoc.description.clone())
}

#[async_trait]
impl DirectConnectApi for FakeDirectConnect {
    async fn create_gateway_association(
        &self,
        input: CreateGatewayAssociationInput,
    ) -> Result<CreateGatewayAssociationOutput, ApiError> {
        let id = format!("ga-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let description = AssociationDescription {
            association_id: id.clone(),
            dx_gateway_id: input.dx_gateway_id,
            associated_gateway_id: input.gateway_id,
            association_state: "associating".to_string(),
        };
        self.associations.lock().unwrap().insert(
            id,
            FakeAssociation {
                description: description.clone(),
                polls_until_associated: self.associating_polls,
                polls_until_gone: None,
                reverse_index_only: false,
            },
        );
        Ok(CreateGatewayAssociationOutput {
            association: description,
        })
    }

    async fn describe_gateway_associations(
        &self,
        input: DescribeGatewayAssociationsInput,
    ) -> Result<DescribeGatewayAssociationsOutput, ApiError> {
        let mut associations = self.associations.lock().unwrap();
        let mut matched = Vec::new();
        let mut gone = Vec::new();

        for (key, assoc) in associations.iter_mut() {
            let d = &assoc.description;
            let matches = if let Some(id) = &input.association_id {
                d.association_id == *id
            } else if let Some(vgw) = &input.virtual_gateway_id {
                d.associated_gateway_id == *vgw
            } else if input.dx_gateway_id.is_some() || input.associated_gateway_id.is_some() {
                !assoc.reverse_index_only
                    && input
                        .dx_gateway_id
                        .as_ref()
                        .is_none_or(|v| d.dx_gateway_id == *v)
                    && input
                        .associated_gateway_id
                        .as_ref()
                        .is_none_or(|v| d.associated_gateway_id == *v)
            } else {
                true
            };
            if !matches {
                continue;
            }
            match advance_association(assoc) {
                Some(description) => matched.push(description),
                None => gone.push(key.clone()),
            }
        }
        for key in gone {
            associations.remove(&key);
        }
        Ok(DescribeGatewayAssociationsOutput {
            associations: matched,
            next_token: None,
        })
    }

    async fn delete_gateway_association(
        &self,
        input: DeleteGatewayAssociationInput,
    ) -> Result<(), ApiError> {
        let mut associations = self.associations.lock().unwrap();
        let Some(assoc) = associations.get_mut(&input.association_id) else {
            return Err(ApiError::new(
                "DirectConnectClientException",
                "association does not exist",
            ));
        };
        assoc.polls_until_gone = Some(self.disassociating_polls);
        Ok(())
    }
}

// ---- ECR Public ----

#[derive(Default)]
pub struct FakeEcrPublic {
    pub policies: Mutex<BTreeMap<String, RepositoryPolicyDescription>>,
    /// Gets that answer not-found after a set before the policy is visible
    pub propagation_gets: u32,
    pub pending_gets: Mutex<BTreeMap<String, u32>>,
    pub get_calls: AtomicU32,
}

impl FakeEcrPublic {
    pub fn with_propagation(propagation_gets: u32) -> Self {
        Self {
            propagation_gets,
            ..Default::default()
        }
    }
}

#[async_trait]
impl EcrPublicApi for FakeEcrPublic {
    async fn set_repository_policy(
        &self,
        input: SetRepositoryPolicyInput,
    ) -> Result<RepositoryPolicyDescription, ApiError> {
        let description = RepositoryPolicyDescription {
            repository_name: input.repository_name.clone(),
            registry_id: "123456789012".to_string(),
            policy_text: input.policy_text,
        };
        self.policies
            .lock()
            .unwrap()
            .insert(input.repository_name.clone(), description.clone());
        self.pending_gets
            .lock()
            .unwrap()
            .insert(input.repository_name, self.propagation_gets);
        Ok(description)
    }

    async fn get_repository_policy(
        &self,
        input: GetRepositoryPolicyInput,
    ) -> Result<RepositoryPolicyDescription, ApiError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let mut pending = self.pending_gets.lock().unwrap();
        if let Some(remaining) = pending.get_mut(&input.repository_name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ApiError::new(
                    "RepositoryPolicyNotFoundException",
                    "policy not yet visible",
                ));
            }
        }
        self.policies
            .lock()
            .unwrap()
            .get(&input.repository_name)
            .cloned()
            .ok_or_else(|| ApiError::new("RepositoryPolicyNotFoundException", "no policy"))
    }

    async fn delete_repository_policy(
        &self,
        input: DeleteRepositoryPolicyInput,
    ) -> Result<(), ApiError> {
        match self
            .policies
            .lock()
            .unwrap()
            .remove(&input.repository_name)
        {
            Some(_) => Ok(()),
            None => Err(ApiError::new("RepositoryPolicyNotFoundException", "no policy")),
        }
    }
}

// ---- Global Accelerator ----

#[derive(Default)]
pub struct FakeGlobalAccelerator {
    pub listeners: Mutex<BTreeMap<String, ListenerDescription>>,
    /// Describe calls the accelerator answers IN_PROGRESS after a mutation
    pub deploy_polls: u32,
    pub remaining_deploy_polls: Mutex<u32>,
    pub next_id: AtomicU32,
}

impl FakeGlobalAccelerator {
    pub fn with_deploy_polls(deploy_polls: u32) -> Self {
        Self {
            deploy_polls,
            ..Default::default()
        }
    }

    fn start_deployment(&self) {
        *self.remaining_deploy_polls.lock().unwrap() = self.deploy_polls;
    }
}

fn listener_not_found() -> ApiError {
    ApiError::new("ListenerNotFoundException", "listener not found")
}

#[async_trait]
impl GlobalAcceleratorApi for FakeGlobalAccelerator {
    async fn create_listener(
        &self,
        input: CreateListenerInput,
    ) -> Result<ListenerDescription, ApiError> {
        let arn = format!(
            "{}/listener/l-{}",
            input.accelerator_arn,
            self.next_id.fetch_add(1, Ordering::SeqCst)
        );
        let listener = ListenerDescription {
            listener_arn: arn.clone(),
            protocol: input.protocol,
            port_ranges: input.port_ranges,
            client_affinity: input.client_affinity,
        };
        self.listeners.lock().unwrap().insert(arn, listener.clone());
        self.start_deployment();
        Ok(listener)
    }

    async fn describe_listener(
        &self,
        input: DescribeListenerInput,
    ) -> Result<ListenerDescription, ApiError> {
        self.listeners
            .lock()
            .unwrap()
            .get(&input.listener_arn)
            .cloned()
            .ok_or_else(listener_not_found)
    }

    async fn update_listener(
        &self,
        input: UpdateListenerInput,
    ) -> Result<ListenerDescription, ApiError> {
        let mut listeners = self.listeners.lock().unwrap();
        let Some(listener) = listeners.get_mut(&input.listener_arn) else {
            return Err(listener_not_found());
        };
        listener.protocol = input.protocol;
        listener.port_ranges = input.port_ranges;
        listener.client_affinity = input.client_affinity;
        let updated = listener.clone();
        drop(listeners);
        self.start_deployment();
        Ok(updated)
    }

    async fn delete_listener(&self, input: DeleteListenerInput) -> Result<(), ApiError> {
        match self.listeners.lock().unwrap().remove(&input.listener_arn) {
            Some(_) => {
                self.start_deployment();
                Ok(())
            }
            None => Err(listener_not_found()),
        }
    }

    async fn describe_accelerator(
        &self,
        input: DescribeAcceleratorInput,
    ) -> Result<AcceleratorDescription, ApiError> {
        let mut remaining = self.remaining_deploy_polls.lock().unwrap();
        let status = if *remaining > 0 {
            *remaining -= 1;
            "IN_PROGRESS"
        } else {
            "DEPLOYED"
        };
        Ok(AcceleratorDescription {
            accelerator_arn: input.accelerator_arn,
            status: status.to_string(),
        })
    }
}
