use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use hla_sim_shared::{
    AttributeHandle, AttributeValues, ClassHandle, FederateHandle, LogicalTime, ObjectHandle,
    ResignAction, RtiError,
};

use crate::local_rti::object_model::ObjectModel;

/// A callback waiting for its federate's next tick
#[derive(Clone, Debug)]
pub(crate) enum Delivery {
    Discover {
        object: ObjectHandle,
        class: ClassHandle,
        name: String,
    },
    Reflect {
        object: ObjectHandle,
        values: AttributeValues,
        time: Option<LogicalTime>,
    },
    Remove {
        object: ObjectHandle,
        time: Option<LogicalTime>,
    },
    ProvideUpdate {
        object: ObjectHandle,
        attributes: Vec<AttributeHandle>,
    },
    Acquired {
        object: ObjectHandle,
        attributes: Vec<AttributeHandle>,
    },
    Unavailable {
        object: ObjectHandle,
        attributes: Vec<AttributeHandle>,
    },
    ConstrainedEnabled(LogicalTime),
    RegulationEnabled(LogicalTime),
    Grant(LogicalTime),
}

// Timed
struct Timed {
    time: LogicalTime,
    sequence: u64,
    delivery: Delivery,
}

// Member
struct Member {
    name: String,
    pending: VecDeque<Delivery>,
    timed: Vec<Timed>,
    published: HashMap<ClassHandle, BTreeSet<AttributeHandle>>,
    subscribed: HashMap<ClassHandle, BTreeSet<AttributeHandle>>,
    known: HashSet<ObjectHandle>,
    constrained: bool,
    regulating: bool,
    lookahead: LogicalTime,
    granted: LogicalTime,
    requested: Option<LogicalTime>,
}

impl Member {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pending: VecDeque::new(),
            timed: Vec::new(),
            published: HashMap::new(),
            subscribed: HashMap::new(),
            known: HashSet::new(),
            constrained: false,
            regulating: false,
            lookahead: 0.0,
            granted: 0.0,
            requested: None,
        }
    }

    fn earliest_timed(&self) -> Option<LogicalTime> {
        self.timed.first().map(|timed| timed.time)
    }

    /// Lowest timestamp this federate may still send with
    fn bound(&self) -> LogicalTime {
        let time = match self.requested {
            Some(requested) => self
                .earliest_timed()
                .map_or(requested, |earliest| earliest.min(requested)),
            None => self.granted,
        };
        time + self.lookahead
    }

    fn subscribes(&self, class: ClassHandle) -> bool {
        self.subscribed.contains_key(&class)
    }
}

// Instance
struct Instance {
    class: ClassHandle,
    registrar: FederateHandle,
    owners: BTreeMap<AttributeHandle, Option<FederateHandle>>,
}

impl Instance {
    /// Who answers for an attribute: its owner, or the registrar while nobody owns it
    fn answerer(&self, attribute: AttributeHandle) -> FederateHandle {
        self.owners
            .get(&attribute)
            .copied()
            .flatten()
            .unwrap_or(self.registrar)
    }
}

/// One federation execution of a [`LocalFederation`](super::LocalFederation)
pub(crate) struct Execution {
    name: String,
    members: BTreeMap<FederateHandle, Member>,
    instances: BTreeMap<ObjectHandle, Instance>,
    next_federate: u32,
    next_object: u32,
    sequence: u64,
}

impl Execution {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            members: BTreeMap::new(),
            instances: BTreeMap::new(),
            next_federate: 0,
            next_object: 0,
            sequence: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn owner(
        &self,
        object: ObjectHandle,
        attribute: AttributeHandle,
    ) -> Option<FederateHandle> {
        self.instances.get(&object)?.owners.get(&attribute).copied().flatten()
    }

    pub(crate) fn instance_count(&self) -> usize {
        self.instances.len()
    }

    // Federation Management

    pub(crate) fn join(&mut self, name: &str) -> Result<FederateHandle, RtiError> {
        if self.members.values().any(|member| member.name == name) {
            return Err(RtiError::FederateAlreadyExecutionMember {
                federate: name.to_string(),
                federation: self.name.clone(),
            });
        }
        self.next_federate += 1;
        let federate = FederateHandle::new(self.next_federate);
        self.members.insert(federate, Member::new(name));
        Ok(federate)
    }

    pub(crate) fn resign(&mut self, federate: FederateHandle, action: ResignAction) {
        self.members.remove(&federate);

        let release = matches!(
            action,
            ResignAction::ReleaseAttributes | ResignAction::DeleteObjectsAndReleaseAttributes
        );
        let delete = matches!(
            action,
            ResignAction::DeleteObjects | ResignAction::DeleteObjectsAndReleaseAttributes
        );

        if release {
            for instance in self.instances.values_mut() {
                for owner in instance.owners.values_mut() {
                    if *owner == Some(federate) {
                        *owner = None;
                    }
                }
            }
        }
        if delete {
            let registered: Vec<ObjectHandle> = self
                .instances
                .iter()
                .filter(|(_, instance)| instance.registrar == federate)
                .map(|(object, _)| *object)
                .collect();
            for object in registered {
                self.instances.remove(&object);
                for member in self.members.values_mut() {
                    if member.known.remove(&object) {
                        member.pending.push_back(Delivery::Remove { object, time: None });
                    }
                }
            }
        }
        self.grant_available();
    }

    // Declaration Management

    pub(crate) fn publish(
        &mut self,
        federate: FederateHandle,
        class: ClassHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError> {
        let member = self.member_mut(federate)?;
        member
            .published
            .entry(class)
            .or_default()
            .extend(attributes.iter().copied());
        Ok(())
    }

    /// Record interest, then discover every existing instance of the class to the subscriber
    pub(crate) fn subscribe(
        &mut self,
        federate: FederateHandle,
        class: ClassHandle,
        attributes: &[AttributeHandle],
        model: &ObjectModel,
    ) -> Result<(), RtiError> {
        let existing: Vec<ObjectHandle> = self
            .instances
            .iter()
            .filter(|(_, instance)| instance.class == class && instance.registrar != federate)
            .map(|(object, _)| *object)
            .collect();

        let member = self.member_mut(federate)?;
        member
            .subscribed
            .entry(class)
            .or_default()
            .extend(attributes.iter().copied());
        for object in existing {
            if member.known.insert(object) {
                member.pending.push_back(Delivery::Discover {
                    object,
                    class,
                    name: instance_name(model, class, object),
                });
            }
        }
        Ok(())
    }

    // Object Management

    pub(crate) fn register(
        &mut self,
        federate: FederateHandle,
        class: ClassHandle,
        model: &ObjectModel,
    ) -> Result<ObjectHandle, RtiError> {
        if !self.member(federate)?.published.contains_key(&class) {
            return Err(RtiError::ObjectClassNotPublished { class });
        }

        self.next_object += 1;
        let object = ObjectHandle::new(self.next_object);
        let owners = model
            .attributes(class)
            .into_iter()
            .map(|attribute| (attribute, Some(federate)))
            .collect();
        self.instances.insert(
            object,
            Instance {
                class,
                registrar: federate,
                owners,
            },
        );

        let name = instance_name(model, class, object);
        for (handle, member) in self.members.iter_mut() {
            if *handle != federate && member.subscribes(class) && member.known.insert(object) {
                member.pending.push_back(Delivery::Discover {
                    object,
                    class,
                    name: name.clone(),
                });
            }
        }
        Ok(object)
    }

    pub(crate) fn update(
        &mut self,
        federate: FederateHandle,
        object: ObjectHandle,
        values: &AttributeValues,
        time: LogicalTime,
    ) -> Result<(), RtiError> {
        let instance = self
            .instances
            .get(&object)
            .ok_or(RtiError::ObjectNotKnown { object })?;
        for attribute in values.handles() {
            if instance.answerer(attribute) != federate {
                return Err(RtiError::AttributeNotOwned { object, attribute });
            }
        }
        let class = instance.class;
        let registrar = instance.registrar;

        let sender = self.member(federate)?;
        if sender.regulating && time < sender.granted + sender.lookahead {
            return Err(RtiError::InvalidFederationTime {
                requested: time,
                current: sender.granted,
            });
        }
        let regulating = sender.regulating;

        let receivers: Vec<FederateHandle> = self
            .members
            .iter()
            .filter(|(handle, member)| {
                **handle != federate && (**handle == registrar || member.known.contains(&object))
            })
            .map(|(handle, _)| *handle)
            .collect();
        for receiver in receivers {
            let Some(subscribed) = self
                .members
                .get(&receiver)
                .and_then(|member| member.subscribed.get(&class))
            else {
                continue;
            };
            let mut filtered = AttributeValues::new();
            for (attribute, bytes) in values.iter() {
                if subscribed.contains(&attribute) {
                    filtered.push(attribute, bytes.to_vec());
                }
            }
            if filtered.is_empty() {
                continue;
            }
            let timestamped = regulating && self.is_constrained(receiver);
            self.post(
                receiver,
                time,
                timestamped,
                Delivery::Reflect {
                    object,
                    values: filtered,
                    time: timestamped.then_some(time),
                },
            );
        }
        self.grant_available();
        Ok(())
    }

    pub(crate) fn delete(
        &mut self,
        federate: FederateHandle,
        object: ObjectHandle,
        time: LogicalTime,
    ) -> Result<(), RtiError> {
        let instance = self
            .instances
            .get(&object)
            .ok_or(RtiError::ObjectNotKnown { object })?;
        if instance.registrar != federate {
            return Err(RtiError::Internal {
                message: format!("{federate} may not delete {object}"),
            });
        }
        self.instances.remove(&object);
        let regulating = self.member(federate)?.regulating;

        let receivers: Vec<FederateHandle> = self
            .members
            .iter_mut()
            .filter_map(|(handle, member)| member.known.remove(&object).then_some(*handle))
            .collect();
        for receiver in receivers {
            let timestamped = regulating && self.is_constrained(receiver);
            self.post(
                receiver,
                time,
                timestamped,
                Delivery::Remove {
                    object,
                    time: timestamped.then_some(time),
                },
            );
        }
        self.grant_available();
        Ok(())
    }

    /// Ask whoever answers for each attribute to provide its value
    pub(crate) fn request_update(
        &mut self,
        federate: FederateHandle,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError> {
        let instance = self
            .instances
            .get(&object)
            .ok_or(RtiError::ObjectNotKnown { object })?;
        let mut requests: BTreeMap<FederateHandle, Vec<AttributeHandle>> = BTreeMap::new();
        for attribute in attributes {
            let answerer = instance.answerer(*attribute);
            if answerer != federate {
                requests.entry(answerer).or_default().push(*attribute);
            }
        }
        for (answerer, attributes) in requests {
            if let Some(member) = self.members.get_mut(&answerer) {
                member
                    .pending
                    .push_back(Delivery::ProvideUpdate { object, attributes });
            }
        }
        Ok(())
    }

    // Ownership Management

    pub(crate) fn acquire(
        &mut self,
        federate: FederateHandle,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError> {
        self.member(federate)?;
        let instance = self
            .instances
            .get_mut(&object)
            .ok_or(RtiError::ObjectNotKnown { object })?;
        if attributes
            .iter()
            .all(|attribute| instance.owners.get(attribute) == Some(&Some(federate)))
        {
            return Err(RtiError::FederateOwnsAttributes { object });
        }

        let mut acquired = Vec::new();
        let mut unavailable = Vec::new();
        for attribute in attributes {
            let Some(owner) = instance.owners.get_mut(attribute) else {
                return Err(RtiError::Internal {
                    message: format!("{attribute} is not an attribute of {object}"),
                });
            };
            match *owner {
                None => {
                    *owner = Some(federate);
                    acquired.push(*attribute);
                }
                Some(holder) if holder == federate => {}
                Some(_) => unavailable.push(*attribute),
            }
        }

        let member = self.member_mut(federate)?;
        if !acquired.is_empty() {
            member.pending.push_back(Delivery::Acquired {
                object,
                attributes: acquired,
            });
        }
        if !unavailable.is_empty() {
            member.pending.push_back(Delivery::Unavailable {
                object,
                attributes: unavailable,
            });
        }
        Ok(())
    }

    pub(crate) fn divest(
        &mut self,
        federate: FederateHandle,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) -> Result<(), RtiError> {
        let instance = self
            .instances
            .get_mut(&object)
            .ok_or(RtiError::ObjectNotKnown { object })?;
        for attribute in attributes {
            if instance.owners.get(attribute) != Some(&Some(federate)) {
                return Err(RtiError::AttributeNotOwned {
                    object,
                    attribute: *attribute,
                });
            }
        }
        for attribute in attributes {
            instance.owners.insert(*attribute, None);
        }
        Ok(())
    }

    pub(crate) fn release(
        &mut self,
        federate: FederateHandle,
        object: ObjectHandle,
        attributes: &[AttributeHandle],
    ) -> Result<Vec<AttributeHandle>, RtiError> {
        let instance = self
            .instances
            .get_mut(&object)
            .ok_or(RtiError::ObjectNotKnown { object })?;
        let mut released = Vec::new();
        for attribute in attributes {
            if let Some(owner) = instance.owners.get_mut(attribute) {
                if *owner == Some(federate) {
                    *owner = None;
                    released.push(*attribute);
                }
            }
        }
        Ok(released)
    }

    // Time Management

    pub(crate) fn enable_constrained(&mut self, federate: FederateHandle) -> Result<(), RtiError> {
        let member = self.member_mut(federate)?;
        if member.constrained {
            return Err(RtiError::TimeAlreadyEnabled {
                operation: "constrained",
            });
        }
        member.constrained = true;
        let granted = member.granted;
        member.pending.push_back(Delivery::ConstrainedEnabled(granted));
        Ok(())
    }

    pub(crate) fn enable_regulation(
        &mut self,
        federate: FederateHandle,
        time: LogicalTime,
        lookahead: LogicalTime,
    ) -> Result<(), RtiError> {
        let member = self.member_mut(federate)?;
        if member.regulating {
            return Err(RtiError::TimeAlreadyEnabled {
                operation: "regulation",
            });
        }
        member.regulating = true;
        member.lookahead = lookahead;
        member.granted = member.granted.max(time);
        let granted = member.granted;
        member.pending.push_back(Delivery::RegulationEnabled(granted));
        Ok(())
    }

    pub(crate) fn next_event_request(
        &mut self,
        federate: FederateHandle,
        time: LogicalTime,
    ) -> Result<(), RtiError> {
        let member = self.member_mut(federate)?;
        if member.requested.is_some() {
            return Err(RtiError::TimeAdvanceAlreadyInProgress);
        }
        if time < member.granted {
            return Err(RtiError::InvalidFederationTime {
                requested: time,
                current: member.granted,
            });
        }
        member.requested = Some(time);
        self.grant_available();
        Ok(())
    }

    /// Grant every outstanding request the lower bounds allow, until nothing moves
    pub(crate) fn grant_available(&mut self) {
        loop {
            let mut progressed = false;
            let handles: Vec<FederateHandle> = self.members.keys().copied().collect();
            for federate in handles {
                if let Some(time) = self.grantable(federate) {
                    self.grant(federate, time);
                    progressed = true;
                }
            }
            if !progressed {
                return;
            }
        }
    }

    /// Queue a callback for one federate outside of any RTI service
    pub(crate) fn inject(&mut self, federate: FederateHandle, delivery: Delivery) {
        if let Some(member) = self.members.get_mut(&federate) {
            member.pending.push_back(delivery);
        }
    }

    pub(crate) fn take_pending(&mut self, federate: FederateHandle) -> Vec<Delivery> {
        self.members
            .get_mut(&federate)
            .map(|member| member.pending.drain(..).collect())
            .unwrap_or_default()
    }

    fn grantable(&self, federate: FederateHandle) -> Option<LogicalTime> {
        let member = self.members.get(&federate)?;
        let requested = member.requested?;
        if !member.constrained {
            return Some(requested);
        }
        let candidate = member
            .earliest_timed()
            .map_or(requested, |earliest| earliest.min(requested));
        let bound = self
            .members
            .iter()
            .filter(|(handle, other)| **handle != federate && other.regulating)
            .map(|(_, other)| other.bound())
            .fold(LogicalTime::INFINITY, LogicalTime::min);
        (candidate <= bound).then_some(candidate)
    }

    fn grant(&mut self, federate: FederateHandle, time: LogicalTime) {
        let Some(member) = self.members.get_mut(&federate) else {
            return;
        };
        member.requested = None;
        member.granted = time;
        let due = member.timed.iter().take_while(|timed| timed.time <= time).count();
        for timed in member.timed.drain(..due) {
            member.pending.push_back(timed.delivery);
        }
        member.pending.push_back(Delivery::Grant(time));
    }

    fn post(
        &mut self,
        receiver: FederateHandle,
        time: LogicalTime,
        timestamped: bool,
        delivery: Delivery,
    ) {
        self.sequence += 1;
        let sequence = self.sequence;
        let Some(member) = self.members.get_mut(&receiver) else {
            return;
        };
        if !timestamped || time <= member.granted {
            member.pending.push_back(delivery);
            return;
        }
        let index = member
            .timed
            .iter()
            .position(|timed| (timed.time, timed.sequence) > (time, sequence))
            .unwrap_or(member.timed.len());
        member.timed.insert(
            index,
            Timed {
                time,
                sequence,
                delivery,
            },
        );
    }

    fn is_constrained(&self, federate: FederateHandle) -> bool {
        self.members
            .get(&federate)
            .is_some_and(|member| member.constrained)
    }

    fn member(&self, federate: FederateHandle) -> Result<&Member, RtiError> {
        self.members
            .get(&federate)
            .ok_or(RtiError::FederateNotExecutionMember)
    }

    fn member_mut(&mut self, federate: FederateHandle) -> Result<&mut Member, RtiError> {
        self.members
            .get_mut(&federate)
            .ok_or(RtiError::FederateNotExecutionMember)
    }
}

fn instance_name(model: &ObjectModel, class: ClassHandle, object: ObjectHandle) -> String {
    format!(
        "{}-{}",
        model.class_name(class).unwrap_or("object"),
        object.value()
    )
}
