use log::{debug, info, warn};

use hla_sim_shared::{
    AttributeHandle, CallbackBuffer, CancellationToken, Callback, ClassLookup, EventQueue,
    FederateHandle,
    FederateRole, LogicalTime, ObjectError, ObjectHandle, ObjectLookup, OwnershipRequestStatus,
    OwnershipState, ProxyList, PublicVariable, ResignAction, RtiAmbassador, RtiError, RtiLink,
    SessionId, SharedObject, TickKind, TimeChannel, TimeListener,
};

use crate::{
    advancer::Advancer,
    coupler::Coupler,
    error::FederateError,
    federate_config::FederateConfig,
    manager::{ExternalEvent, InstanceGuard},
};

/// A federate's connection to the federation, and the entry point for model code
///
/// Construction runs the fixed startup sequence: join, couple, then resolve the shared
/// classes. Everything afterwards happens on the thread that owns the manager; RTI
/// callbacks only reach it through [`FederateManager::flush_callback_buffer`].
pub struct FederateManager {
    config: FederateConfig,
    link: RtiLink,
    role: FederateRole,
    federate: FederateHandle,
    session: SessionId,
    coupler: Coupler,
    advancer: Advancer,
    objects: ObjectLookup,
    external: EventQueue<ExternalEvent>,
    refreshes: Vec<(ObjectHandle, Vec<AttributeHandle>)>,
    _guard: Option<InstanceGuard>,
}

impl FederateManager {
    /// Join the federation, run the rendezvous and resolve `classes`
    pub fn create(
        config: FederateConfig,
        classes: ClassLookup,
        ambassador: Box<dyn RtiAmbassador>,
    ) -> Result<Self, FederateError> {
        Self::create_with_cancellation(config, classes, ambassador, CancellationToken::new())
    }

    /// As [`FederateManager::create`], with a token that aborts any of the startup waits
    pub fn create_with_cancellation(
        config: FederateConfig,
        classes: ClassLookup,
        ambassador: Box<dyn RtiAmbassador>,
        cancel: CancellationToken,
    ) -> Result<Self, FederateError> {
        let guard = if config.single_instance {
            Some(InstanceGuard::acquire()?)
        } else {
            None
        };
        classes
            .verify()
            .map_err(|source| FederateError::BadClassTree { source })?;

        let (mutator, accessor) = TimeChannel::new_channel();
        let callbacks = CallbackBuffer::new(mutator, config.logging);
        let mut link = RtiLink::new(
            ambassador,
            callbacks.clone(),
            accessor,
            config.tick.clone(),
            cancel,
        );

        let (role, federate) = Self::join(&mut link, &config, &callbacks)?;

        let mut coupler = Coupler::new(role, config.num_federates);
        let mut advancer = Advancer::new();
        let session = Self::couple(&mut link, &mut coupler, &mut advancer)?;

        let objects = Self::init_database(&mut link, classes)?;
        info!(
            "{} ready in {} as {federate}, {session}",
            config.federate_name, config.federation_name
        );

        Ok(Self {
            config,
            link,
            role,
            federate,
            session,
            coupler,
            advancer,
            objects,
            external: EventQueue::new(),
            refreshes: Vec::new(),
            _guard: guard,
        })
    }

    fn join(
        link: &mut RtiLink,
        config: &FederateConfig,
        callbacks: &CallbackBuffer,
    ) -> Result<(FederateRole, FederateHandle), FederateError> {
        let role = if config.create_federation {
            match link
                .ambassador()
                .create_federation_execution(&config.federation_name, &config.fed_file)
            {
                Ok(()) => {
                    info!("Created federation {}", config.federation_name);
                    FederateRole::Leader
                }
                Err(RtiError::FederationExecutionAlreadyExists { .. }) => {
                    info!("Federation {} already exists", config.federation_name);
                    FederateRole::Follower
                }
                Err(source) => {
                    return Err(FederateError::rti("create the federation execution", source))
                }
            }
        } else {
            FederateRole::Follower
        };

        let timeout = link.config().coupling_timeout;
        let federate = link.wait_for::<_, FederateError, _>("join the federation", timeout, |link| {
            match link.ambassador().join_federation_execution(
                &config.federate_name,
                &config.federation_name,
                Box::new(callbacks.clone()),
            ) {
                Ok(federate) => Ok(Some(federate)),
                Err(RtiError::FederationExecutionDoesNotExist { .. }) => {
                    debug!("Federation {} does not exist yet", config.federation_name);
                    Ok(None)
                }
                Err(source) => Err(FederateError::rti("join the federation execution", source)),
            }
        })?;

        info!(
            "{} joined {} as {federate} ({role:?})",
            config.federate_name, config.federation_name
        );
        Ok((role, federate))
    }

    fn couple(
        link: &mut RtiLink,
        coupler: &mut Coupler,
        advancer: &mut Advancer,
    ) -> Result<SessionId, FederateError> {
        coupler.initialise(link)?;
        advancer.initialise(link)?;
        let time = link.granted_time()?;
        Ok(coupler.finalise(link, time)?)
    }

    fn init_database(
        link: &mut RtiLink,
        mut classes: ClassLookup,
    ) -> Result<ObjectLookup, FederateError> {
        classes.resolve_names(link.ambassador())?;
        Ok(ObjectLookup::new(classes))
    }

    // Callback Routing

    /// Route everything the RTI has delivered so far
    ///
    /// Ownership outcomes and discoveries apply immediately. Reflections and removals wait in
    /// the external event queue at their timestamp, or at the granted time if they have none.
    /// Refresh requests are held until that queue has been drained.
    pub fn flush_callback_buffer(&mut self) -> Result<(), FederateError> {
        self.objects.apply_ownership_notices(&mut self.link)?;
        let now = self.link.granted_time()?;

        for callback in self.link.take_inbox() {
            if self.coupler.claims(&callback) {
                continue;
            }
            match callback {
                Callback::Discover { object, class } => {
                    if let Err(error) = self.objects.discover_remote_object(object, class) {
                        log_recovered("discovery", object, &error);
                    }
                }
                Callback::Reflect {
                    object,
                    values,
                    time,
                } => self.enqueue_external(ExternalEvent::Reflect { object, values }, time, now),
                Callback::Remove { object, time } => {
                    self.enqueue_external(ExternalEvent::Remove { object }, time, now)
                }
                Callback::ProvideUpdate { object, attributes } => {
                    self.refreshes.push((object, attributes))
                }
                Callback::ReleaseRequest { object, attributes } => info!(
                    "Release of {} attributes of {object} requested; \
                     they are returned at the next reset",
                    attributes.len()
                ),
                other => debug!("Ignoring {}", other.log()),
            }
        }
        Ok(())
    }

    fn enqueue_external(
        &mut self,
        event: ExternalEvent,
        time: Option<LogicalTime>,
        now: LogicalTime,
    ) {
        let object = event.object();
        if let Err(error) = self.external.try_enqueue(event, time.unwrap_or(now)) {
            warn!("Dropped external event for {object}: {error}");
        }
    }

    /// Apply every queued remote change, oldest logical time first, then answer the refresh
    /// requests routed since the last flush
    pub fn flush_external_event_queue(&mut self) {
        while let Some((time, event)) = self.external.next() {
            let object = event.object();
            let result = match event {
                ExternalEvent::Reflect { object, values } => {
                    self.objects.resolve_update(object, &values)
                }
                ExternalEvent::Remove { object } => self.objects.remove_instance(object),
            };
            if let Err(error) = result {
                log_recovered("external event", object, &error);
            } else {
                debug!("Applied external event for {object} at {time}");
            }
        }

        for (object, attributes) in std::mem::take(&mut self.refreshes) {
            if let Err(error) = self.objects.refresh_object(&mut self.link, object, &attributes) {
                log_recovered("refresh", object, &error);
            }
        }
    }

    pub fn external_queue(&self) -> &EventQueue<ExternalEvent> {
        &self.external
    }

    // Objects

    pub fn register_public_object(
        &mut self,
        object: &SharedObject,
    ) -> Result<ObjectHandle, ObjectError> {
        self.objects.register_public_object(&mut self.link, object)
    }

    pub fn delete_public_object(
        &mut self,
        object: &SharedObject,
    ) -> Result<ObjectHandle, ObjectError> {
        self.objects.delete_public_object(&mut self.link, object)
    }

    pub fn proxy_list(&mut self, class_name: &str) -> Result<&mut ProxyList, ObjectError> {
        self.objects.proxy_list(class_name)
    }

    /// Complete proxies of a declared class
    pub fn proxies(&mut self, class_name: &str) -> Result<Vec<SharedObject>, ObjectError> {
        self.objects.proxies(class_name)
    }

    pub fn find_object(&self, object: ObjectHandle) -> Option<SharedObject> {
        self.objects.find_object(object)
    }

    /// Ask the federation to send the full current value of every variable of a proxy
    pub fn request_refresh(&mut self, proxy: &SharedObject) -> Result<(), ObjectError> {
        self.objects.request_refresh(&mut self.link, proxy)
    }

    /// Write a public variable under its ownership policy and publish the change
    ///
    /// Fails with [`ObjectError::Excluded`] when another federate holds the attribute this
    /// tick, and with [`ObjectError::NotOwned`] for viewable variables of proxies.
    pub fn write<V, R>(
        &mut self,
        object: &SharedObject,
        variable: &str,
        apply: impl FnOnce(&mut V) -> R,
    ) -> Result<R, ObjectError>
    where
        V: PublicVariable,
    {
        self.objects.write(&mut self.link, object, variable, apply)
    }

    pub fn check_ownership(
        &mut self,
        object: &SharedObject,
        variable: &str,
    ) -> Result<OwnershipRequestStatus, ObjectError> {
        self.objects.check_ownership(&mut self.link, object, variable)
    }

    pub fn request_ownership(
        &mut self,
        object: &SharedObject,
        variable: &str,
    ) -> Result<OwnershipRequestStatus, ObjectError> {
        self.objects.request_ownership(&mut self.link, object, variable)
    }

    pub fn return_ownership(
        &mut self,
        object: &SharedObject,
        variable: &str,
    ) -> Result<(), ObjectError> {
        self.objects.return_ownership(&mut self.link, object, variable)
    }

    pub fn ownership(
        &self,
        object: &SharedObject,
        variable: &str,
    ) -> Result<OwnershipState, ObjectError> {
        self.objects.ownership(object, variable)
    }

    /// Hand back everything won this tick and chase incomplete proxies
    pub fn reset_ownership(&mut self) {
        self.objects.reset_ownership(&mut self.link);
    }

    /// Delete the local objects model code has dropped, returning their handles
    pub fn clean_public_objects(&mut self) -> Vec<ObjectHandle> {
        self.objects.clean_public_objects(&mut self.link)
    }

    pub fn set_lazy_deletion(&mut self, lazy_deletion: bool) {
        self.config.lazy_deletion = lazy_deletion;
    }

    pub fn lazy_deletion(&self) -> bool {
        self.config.lazy_deletion
    }

    pub fn objects(&self) -> &ObjectLookup {
        &self.objects
    }

    // Time

    pub fn advance_to(&mut self, target: LogicalTime, blocking: bool) -> Result<(), FederateError> {
        self.advancer.advance_to(&mut self.link, target, blocking)
    }

    /// Tick the RTI once without requesting time
    pub fn tick(&mut self) -> Result<(), FederateError> {
        Ok(self.link.tick(TickKind::Long)?)
    }

    /// The granted logical time
    pub fn time(&self) -> Result<LogicalTime, FederateError> {
        Ok(self.link.granted_time()?)
    }

    /// Listeners hear each grant after the advancer has recorded it
    pub fn add_time_listener(&self, listener: Box<dyn TimeListener>) -> Result<(), FederateError> {
        Ok(self.link.time().try_add_listener(listener)?)
    }

    // Accessors

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn federate_name(&self) -> &str {
        &self.config.federate_name
    }

    pub fn federation_name(&self) -> &str {
        &self.config.federation_name
    }

    pub fn federate_handle(&self) -> FederateHandle {
        self.federate
    }

    pub fn role(&self) -> FederateRole {
        self.role
    }

    pub fn config(&self) -> &FederateConfig {
        &self.config
    }

    pub fn cancellation(&self) -> &CancellationToken {
        self.link.cancellation()
    }

    // Shutdown

    /// Resign, releasing every attribute, then destroy the federation once it is empty
    ///
    /// Destruction is retried while other federates are still joined; whoever resigns last
    /// destroys it and everyone else sees it already gone.
    pub fn end_participation(mut self) -> Result<(), FederateError> {
        self.link
            .ambassador()
            .resign_federation_execution(ResignAction::ReleaseAttributes)
            .map_err(|source| FederateError::rti("resign", source))?;
        info!(
            "{} resigned from {}",
            self.config.federate_name, self.config.federation_name
        );

        let federation = self.config.federation_name.clone();
        let timeout = self.link.config().coupling_timeout;
        self.link
            .wait_until::<FederateError, _>("destroy the federation", timeout, |link| {
                match link.ambassador().destroy_federation_execution(&federation) {
                    Ok(()) => {
                        info!("Destroyed federation {federation}");
                        Ok(true)
                    }
                    Err(RtiError::FederatesCurrentlyJoined { .. }) => Ok(false),
                    Err(RtiError::FederationExecutionDoesNotExist { .. }) => Ok(true),
                    Err(source) => Err(FederateError::rti("destroy the federation", source)),
                }
            })
    }
}

fn log_recovered(context: &str, object: ObjectHandle, error: &ObjectError) {
    if error.is_stale_reference() {
        warn!("Skipped {context} for {object} after a deletion race: {error}");
    } else {
        warn!("Skipped {context} for {object}: {error}");
    }
}
