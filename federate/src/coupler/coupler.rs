use std::collections::{HashSet, VecDeque};

use log::{debug, info, warn};

use hla_sim_shared::{
    decode, encode, AttributeHandle, AttributeValues, Callback, ClassHandle, FederateRole,
    LinkError, LogicalTime, ObjectHandle, RtiLink, SessionId, TickKind, FEDEX_CLASS,
    FEDEX_TS_ATTRIBUTE, NODE_CLASS, NODE_NAME_ATTRIBUTE,
};

use crate::coupler::error::CouplingError;

// AdminClass
#[derive(Clone, Copy)]
struct AdminClass {
    class: ClassHandle,
    attribute: AttributeHandle,
}

impl AdminClass {
    fn resolve(
        link: &mut RtiLink,
        class: &'static str,
        attribute: &'static str,
    ) -> Result<Self, CouplingError> {
        let missing = |source| CouplingError::MissingAdminClass {
            class,
            attribute,
            source,
        };
        let class_handle = link.ambassador().object_class_handle(class).map_err(missing)?;
        let attribute_handle = link
            .ambassador()
            .attribute_handle(attribute, class_handle)
            .map_err(missing)?;
        Ok(Self {
            class: class_handle,
            attribute: attribute_handle,
        })
    }
}

/// Rendezvous that gets every federate onto one session before the simulation starts
///
/// Followers each register a `node` instance. Once the leader has discovered one per
/// follower it registers a `fedexID` instance and publishes a fresh [`SessionId`] in its
/// `ts` attribute, timestamped at the current time. Followers keep requesting a zero-length
/// advance until that reflection is delivered.
pub struct Coupler {
    role: FederateRole,
    expected_nodes: usize,
    node: Option<AdminClass>,
    fedex: Option<AdminClass>,
    nodes: HashSet<ObjectHandle>,
    fedex_object: Option<ObjectHandle>,
    admin_objects: HashSet<ObjectHandle>,
    session: Option<SessionId>,
    coupled: bool,
}

impl Coupler {
    /// `num_federates` counts the leader
    pub fn new(role: FederateRole, num_federates: usize) -> Self {
        Self {
            role,
            expected_nodes: num_federates.saturating_sub(1),
            node: None,
            fedex: None,
            nodes: HashSet::new(),
            fedex_object: None,
            admin_objects: HashSet::new(),
            session: None,
            coupled: false,
        }
    }

    pub fn role(&self) -> FederateRole {
        self.role
    }

    pub fn is_coupled(&self) -> bool {
        self.coupled
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Resolve the admin classes and declare this role's interest in them
    pub fn initialise(&mut self, link: &mut RtiLink) -> Result<(), CouplingError> {
        let node = AdminClass::resolve(link, NODE_CLASS, NODE_NAME_ATTRIBUTE)?;
        let fedex = AdminClass::resolve(link, FEDEX_CLASS, FEDEX_TS_ATTRIBUTE)?;

        let (subscribed, published) = match self.role {
            FederateRole::Leader => (node, fedex),
            FederateRole::Follower => (fedex, node),
        };
        link.ambassador()
            .subscribe_object_class_attributes(subscribed.class, &[subscribed.attribute])
            .map_err(|source| CouplingError::rti("subscribe to an admin class", source))?;
        link.ambassador()
            .publish_object_class(published.class, &[published.attribute])
            .map_err(|source| CouplingError::rti("publish an admin class", source))?;

        self.node = Some(node);
        self.fedex = Some(fedex);
        debug!("Coupler initialised as {:?}", self.role);
        Ok(())
    }

    /// Run this role's half of the rendezvous; both roles return the same session id
    pub fn finalise(
        &mut self,
        link: &mut RtiLink,
        time: LogicalTime,
    ) -> Result<SessionId, CouplingError> {
        let session = match self.role {
            FederateRole::Leader => self.lead(link, time)?,
            FederateRole::Follower => self.follow(link, time)?,
        };
        link.time().try_set_coupled().map_err(LinkError::from)?;
        self.session = Some(session);
        self.coupled = true;
        info!("Coupled as {:?} with {session}", self.role);
        Ok(session)
    }

    /// Consume admin traffic, returning false for callbacks that belong to the model
    pub fn claims(&mut self, callback: &Callback) -> bool {
        match callback {
            Callback::Discover { object, class } => self.delegated_discover(*object, *class),
            Callback::Reflect { object, values, .. } => {
                self.delegated_reflect(*object, values) || self.admin_objects.contains(object)
            }
            Callback::Remove { object, .. } => self.admin_objects.remove(object),
            Callback::ProvideUpdate { object, .. }
            | Callback::OwnershipAcquired { object, .. }
            | Callback::OwnershipUnavailable { object, .. }
            | Callback::ReleaseRequest { object, .. } => self.admin_objects.contains(object),
        }
    }

    fn lead(&mut self, link: &mut RtiLink, time: LogicalTime) -> Result<SessionId, CouplingError> {
        let fedex = self.fedex.ok_or(CouplingError::NotInitialised)?;
        let timeout = link.config().coupling_timeout;

        link.wait_until::<CouplingError, _>("every follower to join", timeout, |link| {
            link.tick(TickKind::Long)?;
            self.process_inbox(link);
            Ok(self.nodes.len() >= self.expected_nodes)
        })?;
        info!("All {} followers have joined", self.nodes.len());

        let object = link
            .ambassador()
            .register_object_instance(fedex.class)
            .map_err(|source| CouplingError::rti("register the session object", source))?;
        self.admin_objects.insert(object);
        link.tick(TickKind::Short)?;

        let session = SessionId::now();
        let payload = encode(&session).map_err(|source| CouplingError::Codec { source })?;
        link.ambassador()
            .update_attribute_values(
                object,
                &AttributeValues::single(fedex.attribute, payload),
                time,
            )
            .map_err(|source| CouplingError::rti("publish the session id", source))?;
        link.tick(TickKind::Long)?;
        Ok(session)
    }

    fn follow(
        &mut self,
        link: &mut RtiLink,
        time: LogicalTime,
    ) -> Result<SessionId, CouplingError> {
        let node = self.node.ok_or(CouplingError::NotInitialised)?;
        let timeout = link.config().coupling_timeout;

        let object = link
            .ambassador()
            .register_object_instance(node.class)
            .map_err(|source| CouplingError::rti("register a node", source))?;
        self.admin_objects.insert(object);

        link.wait_until::<CouplingError, _>("the session object", timeout, |link| {
            link.tick(TickKind::Short)?;
            self.process_inbox(link);
            Ok(self.fedex_object.is_some())
        })?;
        debug!("Discovered the session object");

        Self::request_advance(link, time)?;
        let session = link.wait_for::<_, CouplingError, _>("the session id", timeout, |link| {
            if link.time().try_coupling_granted().map_err(LinkError::from)? {
                Self::request_advance(link, time)?;
            }
            link.tick(TickKind::Short)?;
            self.process_inbox(link);
            Ok(self.session)
        })?;

        link.wait_until::<CouplingError, _>("the last coupling grant", timeout, |link| {
            if link.time().try_coupling_granted().map_err(LinkError::from)? {
                return Ok(true);
            }
            link.tick(TickKind::Short)?;
            Ok(false)
        })?;
        Ok(session)
    }

    fn request_advance(link: &mut RtiLink, time: LogicalTime) -> Result<(), CouplingError> {
        link.time()
            .try_begin_coupling_advance()
            .map_err(LinkError::from)?;
        link.ambassador()
            .next_event_request_available(time)
            .map_err(|source| CouplingError::rti("request a coupling advance", source))?;
        link.tick(TickKind::Long)?;
        Ok(())
    }

    /// Take the admin callbacks out of the inbox, leaving the rest for the manager
    fn process_inbox(&mut self, link: &mut RtiLink) {
        let mut deferred = VecDeque::new();
        for callback in link.take_inbox() {
            if !self.claims(&callback) {
                deferred.push_back(callback);
            }
        }
        link.defer(deferred);
    }

    fn delegated_discover(&mut self, object: ObjectHandle, class: ClassHandle) -> bool {
        let is_node = self.node.is_some_and(|node| node.class == class);
        let is_fedex = self.fedex.is_some_and(|fedex| fedex.class == class);
        match self.role {
            FederateRole::Leader if is_node => {
                self.nodes.insert(object);
            }
            FederateRole::Follower if is_fedex => {
                self.fedex_object = Some(object);
            }
            _ if is_node || is_fedex => {}
            _ => return false,
        }
        self.admin_objects.insert(object);
        true
    }

    fn delegated_reflect(&mut self, object: ObjectHandle, values: &AttributeValues) -> bool {
        if self.role.is_leader() || self.fedex_object != Some(object) {
            return false;
        }
        let Some(attribute) = self.fedex.map(|fedex| fedex.attribute) else {
            return false;
        };
        match values.get(attribute).map(decode::<SessionId>) {
            Some(Ok(session)) => {
                if self.session.is_none() {
                    self.session = Some(session);
                }
                true
            }
            Some(Err(error)) => {
                warn!("Ignoring malformed session id from {object}: {error}");
                true
            }
            None => true,
        }
    }
}
