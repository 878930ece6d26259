//! Well-known types of the runtime and of the platform.
use once_cell::sync::Lazy;

use crate::types::ClassType;

macro_rules! class_names {
    ($($name:ident = $package:literal . $simple:literal;)*) => {$(
        pub static $name: Lazy<ClassType> = Lazy::new(|| ClassType::new($package, $simple));
    )*};
}

class_names! {
    BEAN = "tendril.bean" . "Bean";
    INJECT = "tendril.bean" . "Inject";
    SINGLETON = "tendril.bean" . "Singleton";
    FACTORY = "tendril.bean" . "Factory";

    NAMED = "tendril.bean.qualifier" . "Named";
    BEAN_ID = "tendril.bean.qualifier" . "BeanId";
    BEAN_ID_ENUM = "tendril.bean.qualifier" . "BeanIdEnum";
    ENUM_QUALIFIER = "tendril.bean.qualifier" . "EnumQualifier";

    SINGLETON_RECIPE = "tendril.bean.recipe" . "SingletonRecipe";
    FACTORY_RECIPE = "tendril.bean.recipe" . "FactoryRecipe";
    APPLICATOR = "tendril.bean.recipe" . "Applicator";
    INJECTOR = "tendril.bean.recipe" . "Injector";
    DESCRIPTOR = "tendril.bean.recipe" . "Descriptor";
    REGISTRY = "tendril.bean.recipe" . "Registry";

    ENGINE = "tendril.context" . "Engine";

    OVERRIDE = "java.lang" . "Override";
    RETENTION = "java.lang.annotation" . "Retention";
    RETENTION_POLICY = "java.lang.annotation" . "RetentionPolicy";
    TARGET = "java.lang.annotation" . "Target";
    ELEMENT_TYPE = "java.lang.annotation" . "ElementType";
}
